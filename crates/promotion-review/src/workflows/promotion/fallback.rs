//! Ordered lookup tiers that return the first defined answer.
//!
//! Criteria year substitution, tenure sources and grade defaults are all expressed as a
//! [`FallbackChain`] so each tier stays a small named function that can be tested alone.

/// Value produced by a chain together with the name of the tier that supplied it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub tier: &'static str,
    pub value: T,
}

type Tier<'a, I, T> = (&'static str, Box<dyn Fn(&I) -> Option<T> + 'a>);

pub struct FallbackChain<'a, I: ?Sized, T> {
    tiers: Vec<Tier<'a, I, T>>,
}

impl<'a, I: ?Sized, T> FallbackChain<'a, I, T> {
    pub fn new() -> Self {
        Self { tiers: Vec::new() }
    }

    /// Append a tier. Tiers are consulted in insertion order.
    pub fn then<F>(mut self, name: &'static str, tier: F) -> Self
    where
        F: Fn(&I) -> Option<T> + 'a,
    {
        self.tiers.push((name, Box::new(tier)));
        self
    }

    pub fn resolve(&self, input: &I) -> Option<Resolved<T>> {
        self.tiers.iter().find_map(|(name, tier)| {
            tier(input).map(|value| Resolved { tier: name, value })
        })
    }

    pub fn resolve_or(&self, input: &I, default: T) -> T {
        self.resolve(input)
            .map(|resolved| resolved.value)
            .unwrap_or(default)
    }

    pub fn tier_names(&self) -> Vec<&'static str> {
        self.tiers.iter().map(|(name, _)| *name).collect()
    }
}

impl<'a, I: ?Sized, T> Default for FallbackChain<'a, I, T> {
    fn default() -> Self {
        Self::new()
    }
}
