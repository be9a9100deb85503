use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("postprep")
        .version("0.2.0")
        .author("Postprep Contributors")
        .about("Turn a web page into social post material")
        .arg(clap::arg!(<INPUT> "URL to fetch, local HTML file, or '-' for stdin"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (text, json)")
                .value_name("FORMAT")
                .default_value("text")
                .value_parser(["text", "json"]),
        )
        .arg(clap::arg!(--base_url <URL> "Base URL for resolving images in file/stdin input").value_name("URL"))
        .arg(clap::arg!(--caption "Generate a caption for the extracted page"))
        .arg(clap::arg!(--image <URL> "Image to caption (default: first extracted image)").value_name("URL"))
        .arg(clap::arg!(--model <MODEL> "OpenRouter model identifier").value_name("MODEL"))
        .arg(clap::arg!(--tone <TONE> "Caption tone").value_name("TONE"))
        .arg(clap::arg!(--style <STYLE> "Caption style").value_name("STYLE"))
        .arg(clap::arg!(--length <LENGTH> "Caption length").value_name("LENGTH"))
        .arg(clap::arg!(--instruction <TEXT> "Extra free-text instruction for the model").value_name("TEXT"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(clap::arg!(--user_agent <UA> "Custom User-Agent for HTTP requests").value_name("UA"))
        .arg(clap::arg!(-v --verbose "Enable step-by-step progress output"))
        .arg(
            clap::arg!(--completions <SHELL> "Generate shell completion script")
                .value_name("SHELL")
                .value_parser(["bash", "zsh", "fish", "powershell"]),
        );

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "postprep", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "postprep", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "postprep", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "postprep", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
