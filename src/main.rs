//! bounce CLI — headless playback and WAV export.
//!
//! Usage:
//!   bounce path/to/file.mod
//!   bounce path/to/file.mod --wav output.wav

use bounce_master::Controller;
use std::{env, fs};

const USAGE: &str = "Usage: bounce <file.mod> [--wav output.wav]";

/// Extract the `--wav` output path; `Err` when the flag is present without
/// a value.
fn wav_arg(args: &[String]) -> Result<Option<String>, ()> {
    match args.iter().position(|a| a == "--wav") {
        None => Ok(None),
        Some(i) => args.get(i + 1).cloned().map(Some).ok_or(()),
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let path = args.get(1).unwrap_or_else(|| {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    });

    let wav_path = wav_arg(&args).unwrap_or_else(|()| {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    });

    let data = fs::read(path).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {}", path, e);
        std::process::exit(1);
    });

    let mut ctrl = Controller::new();
    ctrl.load_mod(&data).unwrap_or_else(|e| {
        eprintln!("Failed to parse MOD: {}", e);
        std::process::exit(1);
    });

    let song = ctrl.song();
    println!("Title:       {}", song.info.name);
    println!("Tempo:       {} rows/min", song.info.bpm);
    println!("Notes:       {}", song.notes.len());

    let with_data = song.instruments.iter().filter(|i| i.waveform.is_some()).count();
    println!("Instruments: {} (with sample data)", with_data);
    println!("Duration:    {:.1} s", ctrl.duration_seconds());
    println!();

    match wav_path {
        Some(wav) => render_to_wav(&ctrl, &wav),
        None => play_audio(&ctrl),
    }
}

fn play_audio(ctrl: &Controller) {
    println!("Playing...");
    ctrl.play_blocking().unwrap_or_else(|e| {
        eprintln!("Playback failed: {}", e);
        std::process::exit(1);
    });
    println!("Done.");
}

fn render_to_wav(ctrl: &Controller, path: &str) {
    let sample_rate: u32 = 44100;
    println!("Rendering to {} at {} Hz...", path, sample_rate);

    let wav = ctrl.render_to_wav(sample_rate).unwrap_or_else(|e| {
        eprintln!("Render failed: {}", e);
        std::process::exit(1);
    });
    println!("Rendered {} bytes", wav.len());

    fs::write(path, &wav).unwrap_or_else(|e| {
        eprintln!("Failed to write {}: {}", path, e);
        std::process::exit(1);
    });

    println!("Done.");
}

#[cfg(test)]
mod tests {
    use super::wav_arg;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn wav_arg_absent() {
        assert_eq!(wav_arg(&args(&["bounce", "song.mod"])), Ok(None));
    }

    #[test]
    fn wav_arg_with_value() {
        assert_eq!(
            wav_arg(&args(&["bounce", "song.mod", "--wav", "out.wav"])),
            Ok(Some("out.wav".to_string()))
        );
    }

    #[test]
    fn wav_arg_missing_value_is_an_error() {
        assert_eq!(wav_arg(&args(&["bounce", "song.mod", "--wav"])), Err(()));
    }
}
