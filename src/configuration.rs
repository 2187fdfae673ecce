pub trait Configuration: Clone + Send + Sync + 'static {
    fn port(&self) -> u16;
    /// `None` keeps all state in memory.
    fn database_url(&self) -> Option<String>;
    fn token_secret(&self) -> String;
    fn password_hash_cost(&self) -> u32;
    fn reset_database(&self) -> bool;
}
