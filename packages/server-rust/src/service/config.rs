/// Configuration of the operation router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Maximum length in bytes of a request rendered into error messages and
    /// logs. Longer renderings are cut and end in `...`.
    pub max_rendered_message_len: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_rendered_message_len: 4096,
        }
    }
}
