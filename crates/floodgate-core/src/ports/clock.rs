/// Wall-clock source, in whole seconds since the Unix epoch.
///
/// Every instance sharing a counter store must agree on this clock, since the
/// stored scores are compared across processes.
pub trait Clock: Send + Sync {
    fn now_secs(&self) -> u64;
}
