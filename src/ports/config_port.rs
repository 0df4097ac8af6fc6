//! Configuration access port trait.

/// Read-only access to a sectioned key/value configuration.
pub trait ConfigPort {
    /// Trimmed value of `key` in `section`, if present.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Every section name, in no particular order.
    fn sections(&self) -> Vec<String>;
}
