/// Entry point for the cgroup catalog diagnostics.
///
/// Prints the cgroup mode, the selected subsystem mounts and, if `CGROUP_NAME` is set, the
/// paths of the manager created for that cgroup.
///
/// # Examples
///
/// ```bash
/// CGROUP_INCLUDED_METRICS=cpu,memory,diskIO RUST_LOG=debug cargo run
/// ```
fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    cgroup_catalog::run()
}
