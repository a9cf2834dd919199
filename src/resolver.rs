use std::path::Path;

use once_cell::sync::OnceCell;

use crate::{
    config::Config,
    domain::TrackCollection,
    error::{MediaInfoError, Result},
    input::InputReference,
    materialize::{ensure_parser, materialize},
    source::{self, HttpHeadCheck, Reachability},
    tool::{
        ToolHandle,
        runner::{self, ShellRunner, ToolRunner},
        version::Version,
    },
};

/// Main structure that resolves input references into tracks
///
/// The mediainfo binary is only located and version-checked the first time
/// an input actually needs it, so XML inputs work without it installed.
pub struct MediaInfo {
    config: Config,
    runner: Box<dyn ToolRunner>,
    reachability: Box<dyn Reachability>,
    tool: OnceCell<ToolHandle>,
}

impl MediaInfo {
    pub fn new(config: Config) -> Result<Self> {
        let runner = ShellRunner::new(config.tool.timeout());
        let reachability = HttpHeadCheck::new(config.network.timeout());
        Self::with_parts(config, Box::new(runner), Box::new(reachability))
    }

    pub fn with_parts(
        config: Config,
        runner: Box<dyn ToolRunner>,
        reachability: Box<dyn Reachability>,
    ) -> Result<Self> {
        ensure_parser(config.xml.parser_name())?;
        Ok(Self {
            config,
            runner,
            reachability,
            tool: OnceCell::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Located and version-checked tool, computed once
    pub fn tool(&self) -> Result<&ToolHandle> {
        self.tool
            .get_or_try_init(|| ToolHandle::resolve(&self.config.tool, self.runner.as_ref()))
    }

    pub fn version(&self) -> Result<&Version> {
        Ok(&self.tool()?.version)
    }

    /// Runs mediainfo on an already escaped argument and returns the raw XML
    pub fn run(&self, input: Option<&str>) -> Result<String> {
        let tool = self.tool()?;
        runner::run(self.runner.as_ref(), &tool.path, input)
    }

    /// Classifies `input` and resolves it with the matching strategy
    pub fn resolve(&self, input: &str) -> Result<TrackCollection> {
        let reference = InputReference::classify(input)?;
        self.resolve_reference(&reference)
    }

    pub fn resolve_reference(&self, reference: &InputReference) -> Result<TrackCollection> {
        log::info!("resolving {} input {}", reference.kind(), reference);
        match reference {
            InputReference::RawXmlText(xml) => self.from_xml(xml),
            InputReference::RemoteUrl(url) => self.from_url(url),
            InputReference::LocalFilePath(path) => self.from_local_file(path),
        }
    }

    pub fn from_xml(&self, xml: &str) -> Result<TrackCollection> {
        require_non_blank(xml)?;
        Self::into_tracks(&source::xml::resolve(xml))
    }

    pub fn from_url(&self, url: &str) -> Result<TrackCollection> {
        require_non_blank(url)?;
        let xml = source::url::resolve(url.trim(), self.reachability.as_ref(), |escaped| {
            self.run(Some(escaped))
        })?;
        Self::into_tracks(&xml)
    }

    pub fn from_local_file(&self, path: impl AsRef<Path>) -> Result<TrackCollection> {
        let xml = source::local::resolve(path.as_ref(), |escaped| self.run(Some(escaped)))?;
        Self::into_tracks(&xml)
    }

    fn into_tracks(xml: &str) -> Result<TrackCollection> {
        let tracks = materialize(xml)?;
        log::info!("resolved {} tracks", tracks.len());
        Ok(tracks)
    }
}

fn require_non_blank(input: &str) -> Result<()> {
    if input.trim().is_empty() {
        return Err(MediaInfoError::Argument(
            "Your input cannot be blank.".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        path::PathBuf,
        sync::Arc,
    };

    use tempfile::{TempDir, tempdir};

    use super::*;
    use crate::{
        config::ToolConfig,
        source::url::tests::FixedStatus,
        tool::runner::{RawOutput, escape_double_quotes, tests::RecordingRunner},
    };

    const XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Mediainfo version="0.7.99">
<File>
<track type="General"><Format>QuickTime</Format><Duration>1500</Duration></track>
<track type="Video"><Format>AVC</Format><Codec.ID>avc1</Codec.ID></track>
</File>
</Mediainfo>"#;

    /// Shares the fakes with the resolver so calls can be inspected afterwards
    struct Shared<T>(Arc<T>);

    impl<T: ToolRunner> ToolRunner for Shared<T> {
        fn run_command(&self, command: &str) -> crate::error::Result<RawOutput> {
            self.0.run_command(command)
        }
    }

    impl<T: Reachability> Reachability for Shared<T> {
        fn head_status(&self, url: &str) -> crate::error::Result<u16> {
            self.0.head_status(url)
        }
    }

    struct Fixture {
        dir: TempDir,
        tool: PathBuf,
        runner: Arc<RecordingRunner>,
        reachability: Arc<FixedStatus>,
        mediainfo: MediaInfo,
    }

    fn fixture(runner: RecordingRunner, status: u16) -> anyhow::Result<Fixture> {
        let dir = tempdir()?;
        let tool = dir.path().join("mediainfo");
        fs::write(&tool, b"")?;

        let config = Config {
            tool: ToolConfig {
                path: Some(tool.clone()),
                ..Default::default()
            },
            ..Default::default()
        };
        let runner = Arc::new(runner);
        let reachability = Arc::new(FixedStatus::new(status));
        let mediainfo = MediaInfo::with_parts(
            config,
            Box::new(Shared(Arc::clone(&runner))),
            Box::new(Shared(Arc::clone(&reachability))),
        )?;

        Ok(Fixture {
            dir,
            tool,
            runner,
            reachability,
            mediainfo,
        })
    }

    fn tool_word(tool: &Path) -> String {
        runner::shell_word(&tool.to_string_lossy())
    }

    // --------------------------------------------------
    // classification and dispatch
    // --------------------------------------------------

    #[test]
    fn test_empty_input_fails_before_any_call() -> anyhow::Result<()> {
        let f = fixture(RecordingRunner::analyzing(XML), 200)?;

        for input in ["", "   "] {
            assert!(matches!(
                f.mediainfo.resolve(input),
                Err(MediaInfoError::InvalidInput(_))
            ));
        }

        assert!(f.runner.commands().is_empty());
        assert!(f.reachability.requested().is_empty());
        Ok(())
    }

    #[test]
    fn test_raw_xml_is_materialized_without_tool() -> anyhow::Result<()> {
        let f = fixture(RecordingRunner::analyzing(""), 200)?;

        let tracks = f.mediainfo.resolve(XML)?;

        assert_eq!(tracks.len(), 2);
        let video = tracks.video().unwrap();
        assert_eq!(video.names().collect::<Vec<_>>(), vec!["format", "codec_id"]);
        assert_eq!(video.get("codec_id"), Some("avc1"));
        assert!(f.runner.commands().is_empty());
        Ok(())
    }

    #[test]
    fn test_local_xml_file_is_read_directly() -> anyhow::Result<()> {
        let f = fixture(RecordingRunner::analyzing(""), 200)?;
        let report = f.dir.path().join("report.xml");
        fs::write(&report, XML)?;

        let tracks = f.mediainfo.resolve(&report.to_string_lossy())?;

        assert_eq!(tracks.general().and_then(|t| t.get("format")), Some("QuickTime"));
        assert!(f.runner.commands().is_empty());
        Ok(())
    }

    #[test]
    fn test_local_media_file_runs_tool_once() -> anyhow::Result<()> {
        let f = fixture(RecordingRunner::analyzing(XML), 200)?;
        let movie = f.dir.path().join("clip.mov");
        fs::write(&movie, b"moov")?;

        let tracks = f.mediainfo.resolve(&movie.to_string_lossy())?;

        assert_eq!(tracks.track_types(), vec!["general", "video"]);
        assert_eq!(
            tracks.general().and_then(|t| t.duration_ms("duration")),
            Some(1500)
        );
        assert_eq!(
            f.runner.analysis_commands(),
            vec![format!(
                "{} {} --Output=XML",
                tool_word(&f.tool),
                escape_double_quotes(&movie.to_string_lossy())
            )]
        );
        Ok(())
    }

    #[test]
    fn test_reachable_url_runs_tool_once() -> anyhow::Result<()> {
        let f = fixture(RecordingRunner::analyzing(XML), 200)?;

        let tracks = f.mediainfo.resolve("http://www.site.com/videofile.mov")?;

        assert_eq!(tracks.len(), 2);
        assert_eq!(f.reachability.requested(), vec!["http://www.site.com/videofile.mov"]);
        assert_eq!(
            f.runner.analysis_commands(),
            vec![format!(
                "{} \"http://www.site.com/videofile.mov\" --Output=XML",
                tool_word(&f.tool)
            )]
        );
        Ok(())
    }

    #[test]
    fn test_unreachable_url_never_runs_tool() -> anyhow::Result<()> {
        let f = fixture(RecordingRunner::analyzing(XML), 404)?;

        let err = f
            .mediainfo
            .resolve("http://www.site.com/missing.mov")
            .unwrap_err();

        assert!(matches!(err, MediaInfoError::RemoteUrl(_)));
        assert!(f.runner.commands().is_empty());
        Ok(())
    }

    // --------------------------------------------------
    // tool handling
    // --------------------------------------------------

    #[test]
    fn test_version_is_checked_once() -> anyhow::Result<()> {
        let f = fixture(RecordingRunner::analyzing(XML), 200)?;
        let movie = f.dir.path().join("clip.mov");
        fs::write(&movie, b"moov")?;

        f.mediainfo.from_local_file(&movie)?;
        f.mediainfo.from_local_file(&movie)?;

        assert_eq!(f.mediainfo.version()?.as_str(), "21.09");
        let version_queries = f
            .runner
            .commands()
            .into_iter()
            .filter(|c| c.ends_with("--Version"))
            .count();
        assert_eq!(version_queries, 1);
        assert_eq!(f.runner.analysis_commands().len(), 2);
        Ok(())
    }

    #[test]
    fn test_incompatible_version_stops_analysis() -> anyhow::Result<()> {
        let f = fixture(RecordingRunner::with_output("MediaInfoLib - v0.7.24"), 200)?;
        let movie = f.dir.path().join("clip.mov");
        fs::write(&movie, b"moov")?;

        let err = f.mediainfo.from_local_file(&movie).unwrap_err();

        assert!(matches!(err, MediaInfoError::IncompatibleVersion { .. }));
        assert!(f.runner.analysis_commands().is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_tool() -> anyhow::Result<()> {
        let f = fixture(RecordingRunner::analyzing(XML), 200)?;
        fs::remove_file(&f.tool)?;
        let movie = f.dir.path().join("clip.mov");
        fs::write(&movie, b"moov")?;

        let err = f.mediainfo.from_local_file(&movie).unwrap_err();

        assert!(matches!(err, MediaInfoError::ToolNotFound(ref p) if *p == f.tool));
        assert!(f.runner.commands().is_empty());
        Ok(())
    }

    #[test]
    fn test_execution_failure_keeps_tool_output() -> anyhow::Result<()> {
        let f = fixture(RecordingRunner::failing("clip.mov: unsupported"), 200)?;
        let movie = f.dir.path().join("clip.mov");
        fs::write(&movie, b"moov")?;

        match f.mediainfo.from_local_file(&movie).unwrap_err() {
            MediaInfoError::Execution { command, output } => {
                assert!(command.contains("clip.mov"));
                assert_eq!(output, "clip.mov: unsupported");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_tool_output_that_is_not_xml() -> anyhow::Result<()> {
        let f = fixture(RecordingRunner::analyzing("General\nFormat : AVC"), 200)?;
        let movie = f.dir.path().join("clip.mov");
        fs::write(&movie, b"moov")?;

        let err = f.mediainfo.from_local_file(&movie).unwrap_err();

        assert!(matches!(err, MediaInfoError::Xml(_)));
        Ok(())
    }

    // --------------------------------------------------
    // explicit entry points
    // --------------------------------------------------

    #[test]
    fn test_explicit_entry_points_reject_blank_input() -> anyhow::Result<()> {
        let f = fixture(RecordingRunner::analyzing(XML), 200)?;

        assert!(matches!(f.mediainfo.from_xml(" "), Err(MediaInfoError::Argument(_))));
        assert!(matches!(f.mediainfo.from_url(""), Err(MediaInfoError::Argument(_))));
        assert!(matches!(
            f.mediainfo.from_local_file(""),
            Err(MediaInfoError::Argument(_))
        ));
        assert!(f.reachability.requested().is_empty());
        Ok(())
    }

    #[test]
    fn test_explicit_xml_skips_classification() -> anyhow::Result<()> {
        let f = fixture(RecordingRunner::analyzing(XML), 200)?;

        let tracks = f
            .mediainfo
            .from_xml(r#"<Mediainfo><track type="Audio"><Format>AAC</Format></track></Mediainfo>"#)?;

        assert_eq!(tracks.audio().and_then(|t| t.get("format")), Some("AAC"));
        Ok(())
    }

    #[test]
    fn test_run_rejects_missing_input() -> anyhow::Result<()> {
        let f = fixture(RecordingRunner::analyzing(XML), 200)?;

        assert!(matches!(f.mediainfo.run(None), Err(MediaInfoError::Argument(_))));
        assert!(f.runner.analysis_commands().is_empty());
        Ok(())
    }

    #[test]
    fn test_unsupported_parser_is_rejected() {
        let mut config = Config::default();
        config.xml.parser = Some("rexml/document".to_string());

        let result = MediaInfo::with_parts(
            config,
            Box::new(RecordingRunner::analyzing(XML)),
            Box::new(FixedStatus::new(200)),
        );

        assert!(matches!(result, Err(MediaInfoError::UnsupportedParser(_))));
    }

    #[test]
    fn test_same_document_twice_gives_equal_tracks() -> anyhow::Result<()> {
        let f = fixture(RecordingRunner::analyzing(XML), 200)?;

        let first = f.mediainfo.from_xml(XML)?;
        let second = f.mediainfo.from_xml(XML)?;

        assert_eq!(first, second);
        Ok(())
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_mediainfo_is_send_and_sync() {
        assert_send_sync::<MediaInfo>();
    }
}
