use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use env_logger::Builder;
use log::{LevelFilter, info};
use pixelvault::media::{self, MAX_IMAGE_SIZE, MAX_MESSAGE_CHARS};
use pixelvault::{format, storage};
use std::io::Write;
use std::path::{Path, PathBuf};
mod auth;

#[derive(Debug, Parser)]
#[command(name = "pixelvault")]
#[command(
    version,
    about = "Encrypt images with a password and hide text in PNGs, offline."
)]
struct Cli {
    /// Directory for generated files when no --output is given
    #[arg(
        long,
        global = true,
        value_name = "DIR",
        env = "PIXELVAULT_OUT_DIR",
        default_value = "."
    )]
    out_dir: PathBuf,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Encrypts an image into a .enc container
    #[command(arg_required_else_help = true)]
    Encrypt {
        image: PathBuf,

        /// Where to write the container
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of container bytes shown in the hex preview
        #[arg(long, default_value_t = format::DEFAULT_PREVIEW_LEN)]
        preview_bytes: usize,
    },

    /// Decrypts a .enc container back into the original image
    #[command(arg_required_else_help = true)]
    Decrypt {
        file: PathBuf,

        /// Where to write the image
        #[arg(short, long, conflicts_with = "data_uri")]
        output: Option<PathBuf>,

        /// Print the image as a data URI instead of writing a file
        #[arg(long, default_value_t = false)]
        data_uri: bool,
    },

    /// Hides a text message inside a PNG
    #[command(arg_required_else_help = true)]
    Embed {
        image: PathBuf,

        /// Message to hide (defaults to the empty message)
        #[arg(short, long, conflicts_with = "message_file")]
        message: Option<String>,

        /// Read the message from a UTF-8 file
        #[arg(long, value_name = "PATH")]
        message_file: Option<PathBuf>,

        /// Where to write the stego PNG
        #[arg(short, long, conflicts_with = "data_uri")]
        output: Option<PathBuf>,

        /// Print the stego PNG as a data URI instead of writing a file
        #[arg(long, default_value_t = false)]
        data_uri: bool,
    },

    /// Prints the message hidden in a PNG
    #[command(arg_required_else_help = true)]
    Extract { image: PathBuf },

    /// Shows how much text a PNG can carry
    #[command(arg_required_else_help = true)]
    Capacity { image: PathBuf },

    /// Shows the layout of a .enc container
    #[command(arg_required_else_help = true)]
    Inspect {
        file: PathBuf,

        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn require_png(path: &Path) -> Result<()> {
    if !media::is_png(path) {
        bail!("steganography only supports PNG images (lossless)");
    }
    Ok(())
}

fn read_message(message: Option<String>, message_file: Option<PathBuf>) -> Result<String> {
    let message = match (message, message_file) {
        (Some(m), _) => m,
        (None, Some(path)) => String::from_utf8(storage::read_input(&path, MAX_IMAGE_SIZE)?)
            .context("message file is not valid UTF-8")?,
        (None, None) => String::new(),
    };

    let chars = message.chars().count();
    if chars > MAX_MESSAGE_CHARS {
        bail!("message too long: {chars} characters, at most {MAX_MESSAGE_CHARS} allowed");
    }
    Ok(message)
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Cli::parse();
    init_logging(args.verbose);

    match args.command {
        Commands::Encrypt {
            image,
            output,
            preview_bytes,
        } => {
            if !media::is_allowed_image(&image) {
                bail!("invalid file type: only PNG, JPG, GIF, BMP allowed");
            }
            let data = storage::read_input(&image, MAX_IMAGE_SIZE)?;
            let password = auth::read_password(true)?;

            let sealed = pixelvault::encrypt(&password, &data)?;
            drop(password);

            let path = match output {
                Some(p) => p,
                None => media::container_name(&image, &args.out_dir)?,
            };
            storage::write_atomic(&path, &sealed)?;
            info!("encrypted {} -> {}", image.display(), path.display());

            println!("image encrypted: {}", path.display());
            println!("size: {} bytes", sealed.len());
            for row in format::hex_rows(&sealed, preview_bytes, 16) {
                println!("{row}");
            }
        }
        Commands::Decrypt {
            file,
            output,
            data_uri,
        } => {
            if !media::is_container(&file) {
                bail!("file must be .{} (encrypted) file", format::EXTENSION);
            }
            let data = storage::read_input(&file, MAX_IMAGE_SIZE + 1024)?;
            let password = auth::read_password(false)?;

            let image = pixelvault::decrypt(&password, &data)?;
            drop(password);

            if data_uri {
                println!("{}", media::data_uri(&image));
            } else {
                let path = match output {
                    Some(p) => p,
                    None => media::decrypted_name(&file, &args.out_dir, &image)?,
                };
                storage::write_atomic(&path, &image)?;
                info!("decrypted {} -> {}", file.display(), path.display());
                println!("image decrypted: {}", path.display());
            }
        }
        Commands::Embed {
            image,
            message,
            message_file,
            output,
            data_uri,
        } => {
            require_png(&image)?;
            let message = read_message(message, message_file)?;
            let data = storage::read_input(&image, MAX_IMAGE_SIZE)?;

            let stego = pixelvault::embed(&data, &message)?;

            if data_uri {
                println!("{}", media::data_uri(&stego));
            } else {
                let path = match output {
                    Some(p) => p,
                    None => media::stego_name(&image, &args.out_dir)?,
                };
                storage::write_atomic(&path, &stego)?;
                info!("embedded {} bytes into {}", message.len(), path.display());
                println!("message embedded: {}", path.display());
            }
        }
        Commands::Extract { image } => {
            require_png(&image)?;
            let data = storage::read_input(&image, MAX_IMAGE_SIZE)?;
            let message = pixelvault::extract(&data)?;
            println!("{message}");
        }
        Commands::Capacity { image } => {
            require_png(&image)?;
            let data = storage::read_input(&image, MAX_IMAGE_SIZE)?;
            let capacity = pixelvault::capacity(&data)?;
            println!("capacity: {} bits", capacity.bits);
            println!("max message: {} bytes", capacity.max_message_bytes);
        }
        Commands::Inspect { file, json } => {
            let data = storage::read_input(&file, MAX_IMAGE_SIZE + 1024)?;
            let info = pixelvault::inspect(&data)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{info}");
                println!("Header:     {}", format::hex_preview(&data, 5));
            }
        }
    }

    Ok(())
}
