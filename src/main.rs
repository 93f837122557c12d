use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};

use mipview::{
    AssemblyOptions, DirStore, UnsupportedMipPolicy, assemble, compose_atlas,
    context::Context,
    render::{GpuAtlas, render_to_image},
};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OnUnsupported {
    /// Upload the compressed bytes as they are (GPU path only).
    Native,
    /// Draw a checker in place of the mip.
    Placeholder,
    /// Abort.
    Fail,
}

impl From<OnUnsupported> for UnsupportedMipPolicy {
    fn from(value: OnUnsupported) -> Self {
        match value {
            OnUnsupported::Native => UnsupportedMipPolicy::NativeUpload,
            OnUnsupported::Placeholder => UnsupportedMipPolicy::Placeholder,
            OnUnsupported::Fail => UnsupportedMipPolicy::Fail,
        }
    }
}

/// Render every mip of a BC-compressed texture side by side into a PNG.
#[derive(Debug, Parser)]
#[command(name = "mipview", version, about)]
struct Cli {
    /// Texture id; files are `texture.description.<id>` and `texture.payload.mip<i>.<id>`.
    texture_id: String,

    /// Directory holding the description and payload files.
    #[arg(long, default_value = ".")]
    assets: PathBuf,

    /// Output image.
    #[arg(long, short, default_value = "mips.png")]
    out: PathBuf,

    /// What to do with mips that have no software decoder (BC2, BC6H, BC7).
    #[arg(long, value_enum, default_value_t = OnUnsupported::Native)]
    on_unsupported: OnUnsupported,

    /// Draw with the GPU instead of composing on the CPU.
    #[arg(long)]
    gpu: bool,

    /// Show the atlas in a window instead of writing a PNG.
    #[cfg(feature = "window")]
    #[arg(long, conflicts_with_all = ["gpu", "out"])]
    window: bool,
}

fn main() -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let cli = Cli::parse();
    let store = DirStore::new(&cli.assets);
    let options = AssemblyOptions::new().with_unsupported(cli.on_unsupported.into());
    let texture = assemble(&store, &cli.texture_id, &options)?;
    if texture.layout.overflows() {
        log::warn!("some mips extend past the canvas and will be cut off");
    }

    #[cfg(feature = "window")]
    if cli.window {
        let title = mipview::window::window_title(&cli.texture_id, &texture.layout);
        return mipview::window::run_window(texture, title);
    }

    let image = if cli.gpu {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(async {
            let ctx = Context::headless().await?;
            let atlas = GpuAtlas::new(&ctx, &texture)?;
            render_to_image(&ctx, &atlas).await
        })?
    } else {
        compose_atlas(&texture, image::Rgba([0, 0, 0, 255]))
    };

    image
        .save(&cli.out)
        .with_context(|| format!("failed to write {}", cli.out.display()))?;
    log::info!(
        "wrote {}x{} atlas to {}",
        image.width(),
        image.height(),
        cli.out.display()
    );
    Ok(())
}
