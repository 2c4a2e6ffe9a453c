/// The font-size dropdown: a fixed option list and the value it displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeSelector {
    options: Vec<u32>,
    value: u32,
}

impl SizeSelector {
    /// `value` is kept as given even when it is not one of `options`, the way
    /// a host control shows its initial value.
    pub fn new(options: Vec<u32>, value: u32) -> Self {
        Self { options, value }
    }

    pub fn options(&self) -> &[u32] {
        &self.options
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn has_option(&self, px: u32) -> bool {
        self.options.contains(&px)
    }

    /// Shows `px` if it is one of the options. Returns whether the displayed
    /// value changed.
    pub fn reflect(&mut self, px: u32) -> bool {
        if !self.has_option(px) || self.value == px {
            return false;
        }
        self.value = px;
        true
    }

    /// Rounds a computed size and reflects it.
    pub fn reflect_computed(&mut self, px: f32) -> bool {
        if !px.is_finite() || px <= 0.0 {
            return false;
        }
        self.reflect(px.round() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::SizeSelector;

    fn selector() -> SizeSelector {
        SizeSelector::new(vec![10, 12, 14, 16], 12)
    }

    #[test]
    fn reflects_listed_values_only() {
        let mut selector = selector();
        assert!(selector.reflect(16));
        assert_eq!(selector.value(), 16);
        assert!(!selector.reflect(13));
        assert_eq!(selector.value(), 16);
    }

    #[test]
    fn rounds_computed_sizes() {
        let mut selector = selector();
        assert!(selector.reflect_computed(13.6));
        assert_eq!(selector.value(), 14);
        assert!(!selector.reflect_computed(18.72));
        assert_eq!(selector.value(), 14);
        assert!(!selector.reflect_computed(f32::NAN));
    }
}
