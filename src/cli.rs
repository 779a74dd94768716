use clap::{Args, Parser, Subcommand};
use moodshift::effects::EffectForm;
use moodshift::job::{SelectedFile, SubmissionForm};
use moodshift_common::EffectKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "moodshift")]
#[command(author, version, about = "Apply audio effects through a remote processing service")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload an audio file, apply effects and follow the job to completion
    Process(ProcessArgs),

    /// List the supported effects and their parameters in chain order
    Effects,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[derive(Args)]
pub struct ProcessArgs {
    /// Audio file to process
    #[arg(required = true)]
    pub file: PathBuf,

    /// Server base URL (overrides config)
    #[arg(long)]
    pub server: Option<String>,

    /// Output format: wav, mp3, m4a, ogg or flac (defaults to config)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Gain in dB
    #[arg(long, value_name = "DB", allow_hyphen_values = true)]
    pub gain: Option<String>,

    /// High-pass filter cutoff in Hz
    #[arg(long, value_name = "HZ")]
    pub high_pass: Option<String>,

    /// Low-pass filter cutoff in Hz
    #[arg(long, value_name = "HZ")]
    pub low_pass: Option<String>,

    /// Playback speed factor (changes pitch too)
    #[arg(long, value_name = "FACTOR")]
    pub speed: Option<String>,

    /// Echo as DELAY_MS,DECAY
    #[arg(long, value_name = "DELAY_MS,DECAY")]
    pub echo: Option<String>,

    /// Reverb as WET,ROOM
    #[arg(long, value_name = "WET,ROOM")]
    pub reverb: Option<String>,

    /// Directory to download the processed file into
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

impl ProcessArgs {
    /// Translate flags into a submission form. Values stay raw so the
    /// effect builder reports bad numbers.
    pub fn to_form(&self) -> SubmissionForm {
        let mut effects = EffectForm::new();

        let single = [
            (EffectKind::Gain, "gain_db", &self.gain),
            (EffectKind::HighPassFilter, "cutoff_hz", &self.high_pass),
            (EffectKind::LowPassFilter, "cutoff_hz", &self.low_pass),
            (EffectKind::SpeedPitch, "factor", &self.speed),
        ];
        for (kind, field, value) in single {
            if let Some(raw) = value {
                effects.enable(kind).set(kind, field, raw.as_str());
            }
        }

        let paired = [
            (EffectKind::Echo, ("delay_ms", "decay_factor"), &self.echo),
            (EffectKind::Reverb, ("wet_level", "room_size"), &self.reverb),
        ];
        for (kind, (first, second), value) in paired {
            if let Some(raw) = value {
                let (a, b) = raw.split_once(',').unwrap_or((raw.as_str(), ""));
                effects.enable(kind).set(kind, first, a).set(kind, second, b);
            }
        }

        SubmissionForm {
            file: Some(SelectedFile::Path(self.file.clone())),
            output_format: self.format.clone().unwrap_or_default(),
            effects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodshift_common::EffectDescriptor;

    fn parse(args: &[&str]) -> ProcessArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Process(args) => args,
            _ => panic!("expected process"),
        }
    }

    #[test]
    fn test_flags_map_to_effects() {
        let args = parse(&[
            "moodshift", "process", "song.wav", "--echo", "250,0.4", "--gain", "-3",
        ]);
        let form = args.to_form();
        assert_eq!(
            form.effects.build().unwrap(),
            vec![
                EffectDescriptor::Gain { gain_db: -3.0 },
                EffectDescriptor::Echo {
                    delay_ms: 250,
                    decay_factor: 0.4
                },
            ]
        );
        assert_eq!(form.output_format, "");
    }

    #[test]
    fn test_half_pair_is_missing_parameter() {
        let args = parse(&["moodshift", "process", "song.wav", "--reverb", "0.3"]);
        assert!(args.to_form().effects.build().is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["moodshift", "effects", "-v", "-c", "x.toml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }
}
