//
// cargo run -- shipping-label.png -o label.zpl
// lp -d Zebra_Technologies_ZTC_GX420d -o raw label.zpl
//
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::info;
use std::{fs::File, io::BufWriter, path::PathBuf};

use zpl_label::{
    recover_label, Config, DetectionConfig, ImageFile, Job, Media, PageBuffer, Rasterizer,
    PRINTER_DPI,
};

#[derive(Parser)]
#[command(name = "zpl-label")]
#[command(about = "Convert a shipping label image into a ZPL print job.")]
struct CommandLine {
    /// Rendered page (PNG, JPEG, TIFF, BMP)
    input: PathBuf,

    /// Write the job here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Resolution the page was rendered at
    #[arg(long, default_value_t = PRINTER_DPI)]
    dpi: u32,

    /// Use the page as is, without looking for a label on letter pages
    #[arg(long)]
    no_extract: bool,

    /// Label stock: 4x6, 4x2 or <width>x<length> in dots
    #[arg(short, long, default_value = "4x6")]
    media: String,

    /// Print speed (0-14)
    #[arg(long, default_value_t = 2)]
    speed: u8,

    /// Darkness (0-30)
    #[arg(long, default_value_t = 25)]
    darkness: u8,

    /// Number of copies (1-99)
    #[arg(short, long, default_value_t = 1)]
    quantity: u32,

    /// Field origin x in dots
    #[arg(short = 'x', long, default_value_t = 0)]
    position_x: u32,

    /// Field origin y in dots
    #[arg(short = 'y', long, default_value_t = 10)]
    position_y: u32,

    /// Black/white threshold (0-255)
    #[arg(short, long, default_value_t = 128)]
    threshold: u8,

    /// Luminance below which a pixel counts as label content
    #[arg(long, default_value_t = 240)]
    ink_threshold: u8,

    /// Vertical strips used when the content box spans the whole page
    #[arg(long, default_value_t = 20)]
    strip_count: u32,

    /// Ink fraction a strip needs to belong to the label
    #[arg(long, default_value_t = 0.02)]
    strip_density: f64,

    /// Distance from the page border, as a fraction of the page, within
    /// which a content box is taken as spanning the whole page
    #[arg(long, default_value_t = 0.05)]
    page_margin: f64,

    /// Fraction of the page height above which content counts as sideways
    #[arg(long, default_value_t = 0.70)]
    span_ratio: f64,

    /// Margin in inches added around small labels
    #[arg(long, default_value_t = 0.2)]
    small_label_margin: f64,
}

impl CommandLine {
    fn print_config(&self) -> Result<Config> {
        let media = Media::from_name(&self.media)
            .ok_or_else(|| anyhow!("unknown label size '{}'", self.media))?;
        let config = Config::new(media)
            .speed(self.speed)
            .darkness(self.darkness)
            .quantity(self.quantity)
            .origin(self.position_x, self.position_y)
            .threshold(self.threshold);
        config.validate()?;
        Ok(config)
    }

    fn detection_config(&self) -> DetectionConfig {
        DetectionConfig::default()
            .ink_threshold(self.ink_threshold)
            .strip_count(self.strip_count)
            .strip_density(self.strip_density)
            .page_margin(self.page_margin)
            .span_ratio(self.span_ratio)
            .small_label_margin(self.small_label_margin)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{}:{}] {} - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.level(),
                record.args()
            )
        })
        .init();

    let args = CommandLine::parse();

    let config = args.print_config()?;
    info!("Printing on {:?}", config.media());

    let page: PageBuffer = ImageFile::new(&args.input)
        .rasterize(args.dpi)
        .with_context(|| format!("failed to load {}", args.input.display()))?;

    let image = if args.no_extract {
        page.into_image()
    } else {
        let label = recover_label(page, &args.detection_config())?;
        info!("{}", label.outcome().status());
        label.into_image()
    };

    let job = Job::new(config, &image)?;
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            job.write_to(BufWriter::new(file))?;
        }
        None => job.write_to(std::io::stdout().lock())?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_defaults_match_library() {
        let args = CommandLine::try_parse_from(["zpl-label", "page.png"]).unwrap();
        assert_eq!(args.detection_config(), DetectionConfig::default());
        assert_eq!(args.print_config().unwrap(), Config::new(Media::Label4x6));
    }

    #[test]
    fn detection_flags_reach_config() {
        let args = CommandLine::try_parse_from([
            "zpl-label",
            "page.png",
            "--ink-threshold",
            "200",
            "--strip-count",
            "10",
            "--strip-density",
            "0.05",
            "--page-margin",
            "0.1",
            "--span-ratio",
            "0.6",
            "--small-label-margin",
            "0.3",
        ])
        .unwrap();
        let expected = DetectionConfig::default()
            .ink_threshold(200)
            .strip_count(10)
            .strip_density(0.05)
            .page_margin(0.1)
            .span_ratio(0.6)
            .small_label_margin(0.3);
        assert_eq!(args.detection_config(), expected);
    }

    #[test]
    fn print_flags_are_validated() {
        let args = CommandLine::try_parse_from(["zpl-label", "page.png", "--darkness", "31"]).unwrap();
        assert!(args.print_config().is_err());

        let args = CommandLine::try_parse_from(["zpl-label", "page.png", "-m", "letter"]).unwrap();
        assert!(args.print_config().is_err());
    }
}
