use tracing_subscriber::EnvFilter;

/// Install the global subscriber; `json` selects machine-readable output.
pub fn init(json: bool) {
    let filter = EnvFilter::from_default_env().add_directive(
        "clawfleet=info"
            .parse()
            .expect("static directive parses"),
    );

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
