fn main() -> anyhow::Result<()> {
    waypoint::cli::run_cli()
}
