fn main() -> anyhow::Result<()> {
    hi_coworking::cli::main()
}
