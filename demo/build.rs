fn main() {
    match typedconf_build::Generator::new().source_dir("src").generate() {
        Ok(warnings) => warnings.report(),
        Err(diagnostics) => {
            diagnostics.report();
            std::process::exit(1);
        }
    }
}
