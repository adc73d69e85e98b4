//! Localized height modifiers and their composition.
//!
//! Modifiers run in ascending `priority` (ties keep declaration order). Each one
//! computes `t = smoothstep(inner, outer, distance)`: `t == 0` inside the inner
//! radius (full effect), `t == 1` beyond the outer radius (untouched).
//!
//! A `hard_cap` modifier records the height it produced as a ceiling. After every
//! later modifier the ceiling is re-applied as `lerp(min(h, ceiling), h, t_cap)`,
//! so nothing downstream can lift terrain inside the capped area, and the cap fades
//! out with the same easing as the modifier that set it.

use polis_geom::{Vec2, lerp, smoothstep};
use serde::Deserialize;

use crate::config::ModifierDef;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// Pull toward `target` from above and below.
    #[default]
    Flatten,
    /// Pull down to at most `target`; lower ground is left alone.
    Ceiling,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Modifier {
    pub name: String,
    pub center: Vec2,
    pub inner: f32,
    pub outer: f32,
    pub target: f32,
    pub mode: BlendMode,
    pub priority: i32,
    pub hard_cap: bool,
}

impl Modifier {
    pub fn flatten(name: impl Into<String>, center: Vec2, inner: f32, outer: f32, target: f32) -> Self {
        Self {
            name: name.into(),
            center,
            inner,
            outer,
            target,
            mode: BlendMode::Flatten,
            priority: 0,
            hard_cap: false,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn hard_capped(mut self) -> Self {
        self.hard_cap = true;
        self
    }

    pub fn from_def(def: &ModifierDef) -> Self {
        let inner = def.inner.max(0.0);
        let outer = def.outer.max(inner);
        if def.outer < def.inner {
            log::warn!(
                "modifier {:?}: outer radius {} below inner {}; clamped",
                def.name,
                def.outer,
                def.inner
            );
        }
        Self {
            name: def.name.clone().unwrap_or_else(|| "modifier".into()),
            center: Vec2::new(def.center[0], def.center[1]),
            inner,
            outer,
            target: def.target,
            mode: def.mode,
            priority: def.priority,
            hard_cap: def.hard_cap,
        }
    }

    /// 0 inside the inner radius, 1 at and beyond the outer radius.
    #[inline]
    pub fn blend_factor(&self, p: Vec2) -> f32 {
        smoothstep(self.inner, self.outer, p.distance(self.center))
    }

    #[inline]
    fn blend(&self, h: f32, t: f32) -> f32 {
        match self.mode {
            BlendMode::Flatten => lerp(self.target, h, t),
            BlendMode::Ceiling => lerp(h.min(self.target), h, t),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ModifierStack {
    ordered: Vec<Modifier>,
}

impl ModifierStack {
    pub fn new(mut modifiers: Vec<Modifier>) -> Self {
        modifiers.sort_by_key(|m| m.priority);
        Self { ordered: modifiers }
    }

    pub fn from_defs(defs: &[ModifierDef]) -> Self {
        Self::new(defs.iter().map(Modifier::from_def).collect())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Modifier> {
        self.ordered.iter()
    }

    pub fn apply(&self, x: f32, z: f32, base: f32) -> f32 {
        let p = Vec2::new(x, z);
        let mut h = base;
        let mut caps: Vec<(f32, f32)> = Vec::new();
        for m in &self.ordered {
            let t = m.blend_factor(p);
            if t >= 1.0 {
                continue;
            }
            h = m.blend(h, t);
            for &(ceiling, tc) in &caps {
                h = lerp(h.min(ceiling), h, tc);
            }
            if m.hard_cap {
                caps.push((h, t));
            }
        }
        h
    }
}
