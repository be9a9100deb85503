use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use postprep_core::{
    CaptionOptions, CaptionRequest, FetchConfig, OpenRouterClient, PageExtract, extract_page, fetch_page,
};

mod echo;
use echo::{print_banner, print_info, print_step, print_success};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for extraction results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: text, json", s)),
        }
    }
}

/// Turn a web page into social post material
#[derive(Parser, Debug)]
#[command(name = "postprep")]
#[command(author = "Postprep Contributors")]
#[command(version = "0.2.0")]
#[command(about = "Extract images and metadata from web pages, optionally caption them", long_about = None)]
struct Args {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    format: OutputFormat,

    /// Base URL for resolving images when reading from a file or stdin
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Generate a caption for the extracted page (needs OPENROUTER_API_KEY)
    #[arg(long)]
    caption: bool,

    /// Image to caption (default: first extracted image)
    #[arg(long, value_name = "URL")]
    image: Option<String>,

    /// OpenRouter model identifier
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,

    /// Caption tone (casual, professional, inspirational, ...)
    #[arg(long, value_name = "TONE")]
    tone: Option<String>,

    /// Caption style (question, cta, tips, ...)
    #[arg(long, value_name = "STYLE")]
    style: Option<String>,

    /// Caption length (short, medium, long)
    #[arg(long, value_name = "LENGTH")]
    length: Option<String>,

    /// Extra free-text instruction for the model
    #[arg(long, value_name = "TEXT")]
    instruction: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Enable step-by-step progress output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let total_steps = if args.caption { 4 } else { 3 };

    if args.verbose {
        print_banner();
    }

    let is_url = args.input.starts_with("http://") || args.input.starts_with("https://");

    let html = if args.input == "-" {
        if args.verbose {
            print_step(1, total_steps, "Reading from stdin");
        }
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else if is_url {
        if args.verbose {
            print_step(
                1,
                total_steps,
                &format!("Fetching {}", args.input.bright_white().underline()),
            );
        }

        let config = FetchConfig {
            timeout: args.timeout,
            user_agent: args
                .user_agent
                .clone()
                .unwrap_or_else(|| FetchConfig::default().user_agent),
        };

        fetch_page(&args.input, &config).await.context("Failed to fetch URL")?
    } else {
        if args.verbose {
            print_step(1, total_steps, &format!("Reading file {}", args.input.bright_white()));
        }
        fs::read_to_string(&args.input).with_context(|| format!("Failed to read file: {}", args.input))?
    };

    let base_url = if is_url {
        args.input.clone()
    } else {
        match &args.base_url {
            Some(base) => {
                url::Url::parse(base).with_context(|| format!("Invalid base URL: {}", base))?;
                base.clone()
            }
            None => bail!("--base-url is required when reading from a file or stdin"),
        }
    };

    if args.verbose {
        print_step(2, total_steps, "Extracting images and metadata");
    }

    let page = extract_page(&html, &base_url).context("Failed to extract page")?;

    if args.verbose {
        print_info(&format!(
            "{} images, title {:?}",
            page.images.len(),
            page.title
        ));
    }

    let caption = if args.caption {
        if args.verbose {
            print_step(3, total_steps, "Generating caption");
        }

        let api_key = std::env::var("OPENROUTER_API_KEY")
            .context("OPENROUTER_API_KEY must be set to generate captions")?;

        let image_url = match args.image.clone().or_else(|| page.images.first().cloned()) {
            Some(url) => url,
            None => bail!("No image found to caption; pass one with --image"),
        };

        let mut options = CaptionOptions::default();
        if let Some(model) = args.model.clone() {
            options.model = model;
        }
        if let Some(tone) = args.tone.clone() {
            options.tone = tone;
        }
        if let Some(style) = args.style.clone() {
            options.style = style;
        }
        if let Some(length) = args.length.clone() {
            options.length = length;
        }
        if let Some(instruction) = args.instruction.clone() {
            options.pre_prompt = instruction;
        }

        let request = CaptionRequest {
            image_url,
            title: page.title.clone(),
            description: page.description.clone(),
            content: page.content.clone(),
            url: page.url.clone(),
        };

        let client = OpenRouterClient::new(api_key);
        let response = client
            .generate(&request, &options)
            .await
            .context("Caption generation failed")?;
        Some(response)
    } else {
        None
    };

    if args.verbose {
        print_step(total_steps, total_steps, "Writing output");
    }

    let output = match args.format {
        OutputFormat::Text => render_text(&page, caption.as_ref().map(|c| c.caption.as_str())),
        OutputFormat::Json => {
            let mut value = serde_json::to_value(&page)?;
            if let Some(response) = &caption {
                value["caption"] = serde_json::Value::String(response.caption.clone());
            }
            serde_json::to_string_pretty(&value)?
        }
    };

    match args.output {
        Some(path) => {
            fs::write(&path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}

/// Human-readable rendering of an extraction.
fn render_text(page: &PageExtract, caption: Option<&str>) -> String {
    let mut out = String::new();

    out.push_str(&format!("Title: {}\n", page.title));
    if !page.description.is_empty() {
        out.push_str(&format!("Description: {}\n", page.description));
    }
    out.push_str(&format!("URL: {}\n", page.url));

    out.push_str(&format!("Images ({}):\n", page.images.len()));
    for image in &page.images {
        out.push_str(&format!("  {}\n", image));
    }

    if let Some(caption) = caption {
        out.push_str(&format!("\nCaption:\n{}\n", caption));
    }

    if !page.content.is_empty() {
        out.push_str(&format!("\nContent:\n{}\n", page.content));
    }

    out
}
