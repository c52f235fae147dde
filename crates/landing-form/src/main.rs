fn main() -> anyhow::Result<()> {
    landing_form::cli::main()
}
