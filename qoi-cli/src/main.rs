use argh::FromArgs;
use image::{ImageFormat, RgbImage, RgbaImage};
use qoi::{Channels, Colorspace, Header, Image};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    str::FromStr,
};

/// QOI cli encoder and decoder.
#[derive(FromArgs)]
struct Cli {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Encode(Encode),
    Decode(Decode),
    Info(Info),
}

/// Decodes a QOI image.
#[derive(FromArgs)]
#[argh(subcommand, name = "decode")]
struct Decode {
    /// output format (png, jpg, bmp)
    #[argh(option)]
    format: Format,

    /// the input QOI file
    #[argh(positional)]
    input: String,
    /// the output file
    #[argh(positional)]
    output: String,
}

/// Prints the header of a QOI image.
#[derive(FromArgs)]
#[argh(subcommand, name = "info")]
struct Info {
    /// the input QOI file
    #[argh(positional)]
    input: String,
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Png,
    Jpg,
    Bmp,
}

impl Format {
    fn image_format(self) -> ImageFormat {
        match self {
            Format::Png => ImageFormat::Png,
            Format::Jpg => ImageFormat::Jpeg,
            Format::Bmp => ImageFormat::Bmp,
        }
    }
}

impl FromStr for Format {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        #[rustfmt::skip]
        let Some(format) = s.eq_ignore_ascii_case("png").then_some(Format::Png)
               .or_else(|| s.eq_ignore_ascii_case("jpg").then_some(Format::Jpg))
               .or_else(|| s.eq_ignore_ascii_case("bmp").then_some(Format::Bmp))
        else { return Err("invalid string"); };

        Ok(format)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let Cli { command } = argh::from_env();

    match command {
        Command::Encode(options) => encode(options),
        Command::Decode(options) => decode(options),
        Command::Info(options) => info(options),
    }
}

/// Encodes an image as QOI.
#[derive(FromArgs)]
#[argh(subcommand, name = "encode")]
struct Encode {
    /// input format, optional (png, jpg, bmp)
    #[argh(option)]
    format: Option<Format>,

    /// tag the image as having all channels linear instead of sRGB
    #[argh(switch)]
    linear: bool,

    /// the input file. May be a PNG, JPG, or BMP.
    #[argh(positional)]
    input: String,
    /// the output file
    #[argh(positional)]
    output: String,
}

fn encode(options: Encode) -> Result<(), Box<dyn std::error::Error>> {
    let Encode {
        format,
        linear,
        input,
        output,
    } = options;

    let image = match format {
        Some(format) => image::io::Reader::with_format(
            BufReader::new(File::open(&input)?),
            format.image_format(),
        )
        .decode()?,
        None => image::io::Reader::open(&input)?
            .with_guessed_format()?
            .decode()?,
    };

    let width = image.width();
    let height = image.height();
    let colorspace = if linear {
        Colorspace::Linear
    } else {
        Colorspace::Srgb
    };

    let qoi_image = if image.color().has_alpha() {
        Image::from_raw(
            width,
            height,
            Channels::Rgba,
            colorspace,
            image.into_rgba8().as_raw(),
        )?
    } else {
        Image::from_raw(
            width,
            height,
            Channels::Rgb,
            colorspace,
            image.into_rgb8().as_raw(),
        )?
    };

    println!(
        "Encoding {width}x{height} image with {} channels",
        qoi_image.channels().count()
    );

    let mut w = BufWriter::new(File::create(&output)?);
    qoi::QoiEncodeContext::encode(&qoi_image, &mut w)?;
    w.flush()?;

    println!("Written `{output}`");

    Ok(())
}

fn decode(options: Decode) -> Result<(), Box<dyn std::error::Error>> {
    let Decode {
        format,
        input,
        output,
    } = options;

    println!("Decoding `{input}`");

    let image = qoi::QoiDecodeContext::decode_reader(BufReader::new(File::open(&input)?))?;
    let (width, height) = (image.width(), image.height());

    match image.channels() {
        Channels::Rgb => RgbImage::from_vec(width, height, image.to_raw())
            .ok_or("failed to create image")?
            .save_with_format(&output, format.image_format())?,
        Channels::Rgba => RgbaImage::from_vec(width, height, image.to_raw())
            .ok_or("failed to create image")?
            .save_with_format(&output, format.image_format())?,
    }

    println!("Written {width}x{height} image to `{output}`");

    Ok(())
}

fn info(options: Info) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(&options.input)?;
    let Header {
        width,
        height,
        channels,
        colorspace,
    } = Header::from_bytes(&data)?;

    println!("`{}`", options.input);
    println!("  dimensions: {width}x{height}");
    println!("  channels:   {channels:?} ({})", channels.count());
    println!("  colorspace: {colorspace:?}");
    println!("  size:       {} bytes", data.len());

    Ok(())
}
