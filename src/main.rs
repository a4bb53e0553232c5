fn main() {
    use ingredient_graph::cli::parse;
    let cli = parse();
    ingredient_graph::utils::logging::init(cli.verbose);
    let code = ingredient_graph::app::run_cli(cli);
    if code != 0 {
        std::process::exit(code);
    }
}
