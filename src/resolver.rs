/// Host primitive that maps a guest path onto the host filesystem.
///
/// Implementations answer only for paths that exist right now: a missing
/// path, or a path below a missing ancestor, yields `None`. There is no
/// partial-match information, so callers retry with shorter prefixes.
pub trait HostResolver: Send + Sync {
    fn resolve_if_exists(&self, guest_path: &str) -> Option<String>;
}

impl<F> HostResolver for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn resolve_if_exists(&self, guest_path: &str) -> Option<String> {
        self(guest_path)
    }
}
