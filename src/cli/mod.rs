use std::fmt::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{config::Config, domain::TrackCollection, resolver::MediaInfo};

#[derive(Parser)]
#[command(name = "mediatracks")]
#[command(version = "0.1")]
#[command(about = "Inspect media metadata through mediainfo")]
pub struct Cli {
    /// Path to an optional config TOML file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the tracks of an XML text, a URL or a local file
    Inspect {
        /// MediaInfo XML, a URL or a file path
        input: String,
        /// Print tracks as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Print the version of the mediainfo binary in use
    Version,
}

/// Entrypoint for CLI, returns the process exit code
pub fn run() -> i32 {
    env_logger::init();
    let cli = Cli::parse();

    match execute(&cli) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e:#}");
            1
        }
    }
}

fn execute(cli: &Cli) -> anyhow::Result<()> {
    let cfg = match &cli.config {
        Some(path) => Config::load(&path.to_string_lossy())?,
        None => Config::default(),
    }
    .with_env_overrides();

    let mediainfo = MediaInfo::new(cfg)?;

    match &cli.command {
        Commands::Inspect { input, json } => {
            let tracks = mediainfo.resolve(input)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&tracks)?);
            } else {
                print!("{}", render_tracks(&tracks));
            }
        }

        Commands::Version => {
            let tool = mediainfo.tool()?;
            println!(
                "mediainfo {} at {}",
                tool.version,
                tool.path.to_string_lossy()
            );
        }
    }
    Ok(())
}

/// Human readable listing, one block per track
pub fn render_tracks(tracks: &TrackCollection) -> String {
    let mut out = String::new();
    for (name, track) in tracks.track_types().iter().zip(tracks) {
        let _ = writeln!(out, "{name}");
        for (attribute, value) in track.iter() {
            let _ = writeln!(out, "  {attribute}: {value}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materialize::materialize;

    #[test]
    fn test_parse_inspect_command() {
        let cli = Cli::try_parse_from(["mediatracks", "inspect", "--json", "/tmp/a.mov"]).unwrap();

        assert!(cli.config.is_none());
        match cli.command {
            Commands::Inspect { input, json } => {
                assert_eq!(input, "/tmp/a.mov");
                assert!(json);
            }
            Commands::Version => panic!("expected inspect"),
        }
    }

    #[test]
    fn test_parse_config_flag() {
        let cli =
            Cli::try_parse_from(["mediatracks", "-c", "mediatracks.toml", "version"]).unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("mediatracks.toml")));
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_render_tracks() -> anyhow::Result<()> {
        let tracks = materialize(
            r#"<Mediainfo>
<track type="General"><Format>MPEG-4</Format></track>
<track type="Audio"><Format>AAC</Format></track>
<track type="Audio"><Format>AC-3</Format><Codec.ID>ac-3</Codec.ID></track>
</Mediainfo>"#,
        )?;

        assert_eq!(
            render_tracks(&tracks),
            "general\n  format: MPEG-4\naudio\n  format: AAC\naudio2\n  format: AC-3\n  codec_id: ac-3\n"
        );
        Ok(())
    }

    #[test]
    fn test_json_output() -> anyhow::Result<()> {
        let tracks = materialize(r#"<Mediainfo><track type="Video"><Width>1920</Width></track></Mediainfo>"#)?;

        assert_eq!(
            serde_json::to_string(&tracks)?,
            r#"[{"type":"video","attributes":{"width":"1920"}}]"#
        );
        Ok(())
    }
}
