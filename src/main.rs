use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::thread;
use std::time::Duration;

use human_repr::HumanCount;
use kdam::{Bar, BarExt, term, tqdm};
use rustop::opts;
use signal_hook::consts::SIGINT;

use vidfix::audio::AudioCodec;
use vidfix::codecs::VideoCodec;
use vidfix::command;
use vidfix::engine::{EngineEvent, TranscodeEngine, parallel_jobs_for};
use vidfix::error::SettingsError;
use vidfix::fstools::{DirEntryCategory, classify_file, collect_video_files, is_video_file};
use vidfix::job::{JobId, JobQueue, JobStatus};
use vidfix::settings::{NamingPattern, Settings, TargetFps, TargetResolution};

fn main() -> ExitCode {
    env_logger::init();

    let (args, _rest) = opts! {
        synopsis "Batch-convert video files into edit-friendly formats with ffmpeg";
        opt codec:String=String::from("dnxhr_sq"), desc:"Video codec. [dnxhr_sq, dnxhr_hq, dnxhr_hqx, prores, h264, h265, vp9, av1]";
        opt resolution:String=String::from("original"), desc:"Target resolution, e.g. 1920x1080, or 'original'.";
        opt fps:String=String::from("original"), desc:"Target frame rate. [24, 25, 30, 50, 60, 120, original]";
        opt audio:String=String::from("pcm"), desc:"Audio codec. [pcm, aac, mp3, flac, opus, vorbis, copy]";
        opt audio_bitrate:String=String::from("192k"), desc:"Audio bitrate for lossy codecs.";
        opt relocate:bool=false, desc:"Write outputs to a 'transcoded' subdirectory.";
        opt pattern:String=String::from("suffix"), desc:"Output naming pattern. [overwrite, suffix, prefix]";
        opt delete_original:bool=false, desc:"Delete each source file after a successful conversion.";
        opt shutdown:bool=false, desc:"Shut the system down once the whole queue has finished.";
        opt jobs:Option<usize>, desc:"Parallel job override (default: derived from CPU count).";
        param input:String, desc:"Input video file or directory";
    }.parse_or_exit();

    let parsed = (
        VideoCodec::from_str(&args.codec),
        TargetResolution::from_str(&args.resolution),
        TargetFps::from_str(&args.fps),
        AudioCodec::from_str(&args.audio),
        NamingPattern::from_str(&args.pattern),
    );
    let settings = match parsed {
        (Ok(video_codec), Ok(target_resolution), Ok(target_fps), Ok(audio_codec), Ok(naming_pattern)) => Settings {
            video_codec,
            target_resolution,
            target_fps,
            audio_codec,
            audio_bitrate: args.audio_bitrate.clone(),
            relocate_output: args.relocate,
            naming_pattern,
            delete_source_on_success: args.delete_original,
            shutdown_on_completion: args.shutdown,
        },
        (video, resolution, fps, audio, pattern) => {
            for err in settings_errors(video, resolution, fps, audio, pattern) {
                println!("{}", err);
            }
            return ExitCode::FAILURE;
        },
    };

    if !command::encoder_available() {
        println!("ffmpeg is not installed.");
        return ExitCode::FAILURE;
    }

    let sources = match collect_sources(&PathBuf::from(&args.input)) {
        Ok(sources) => sources,
        Err(msg) => {
            println!("{}", msg);
            return ExitCode::FAILURE;
        },
    };
    if sources.is_empty() {
        println!("No video files found in {:?}.", args.input);
        return ExitCode::FAILURE;
    }

    let total_size: usize = sources
        .iter()
        .filter_map(|p| std::fs::metadata(p).ok())
        .map(|m| m.len() as usize)
        .sum();
    let parallel_jobs = parallel_jobs_for(num_cpus::get(), args.jobs);
    println!(
        "Converting {} file(s) ({}) to {} / {} @ {} fps, audio {} ({} at a time)",
        sources.len(),
        total_size.human_count_bytes(),
        settings.video_codec,
        settings.target_resolution,
        settings.target_fps,
        settings.audio_codec,
        parallel_jobs,
    );

    let queue = JobQueue::from_paths(sources);
    let mut engine = TranscodeEngine::new(queue);
    let events = engine.subscribe();
    let controller = engine.controller();
    let snapshot = engine.queue_snapshot();

    let interrupted = Arc::new(AtomicBool::new(false));
    if signal_hook::flag::register(SIGINT, Arc::clone(&interrupted)).is_err() {
        println!("Could not install the Ctrl-C handler.");
        return ExitCode::FAILURE;
    }

    term::init(false);
    let mut bars: Vec<(JobId, Bar)> = snapshot
        .iter()
        .enumerate()
        .map(|(position, job)| {
            let name = job
                .source_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| job.source_path.display().to_string());
            let bar = tqdm!(
                total = 100,
                desc = name,
                position = position as u16,
                force_refresh = true
            );
            (job.id, bar)
        })
        .collect();

    let engine_settings = settings.clone();
    let engine_thread = thread::spawn(move || {
        engine.run(&engine_settings, parallel_jobs);
        engine
    });

    let mut cancel_sent = false;
    loop {
        if interrupted.load(Ordering::Relaxed) && !cancel_sent {
            println!("Cancelling; waiting for running jobs to settle.");
            controller.cancel();
            cancel_sent = true;
        }

        match events.recv_timeout(Duration::from_millis(100)) {
            Ok(EngineEvent::JobProgress(job_id, progress)) => {
                if let Some((_, bar)) = bars.iter_mut().find(|(id, _)| *id == job_id) {
                    bar.set_postfix(format!("{} fps", progress.fps));
                    let _ = bar.update_to(progress.percentage as usize);
                }
            },
            Ok(EngineEvent::JobSettled(job_id, status)) => {
                if let Some((_, bar)) = bars.iter_mut().find(|(id, _)| *id == job_id) {
                    match &status {
                        JobStatus::Completed => {
                            bar.set_postfix(String::from("done"));
                            let _ = bar.update_to(100);
                        },
                        other => {
                            bar.set_postfix(format!("{}", other));
                            let _ = bar.refresh();
                        },
                    }
                }
            },
            Ok(EngineEvent::JobStarted(_)) => (),
            Ok(EngineEvent::RunFinished { .. }) => break,
            Err(RecvTimeoutError::Timeout) => (),
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let engine = match engine_thread.join() {
        Ok(engine) => engine,
        Err(_) => {
            println!("The engine thread panicked.");
            return ExitCode::FAILURE;
        },
    };

    println!();
    let mut failures = 0;
    for job in engine.queue_snapshot() {
        match &job.status {
            JobStatus::Completed => (),
            JobStatus::Waiting => {
                println!("skipped: {:?}", job.source_path);
            },
            status => {
                failures += 1;
                println!("{:?}: {}", job.source_path, status);
            },
        }
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn settings_errors(
    video: Result<VideoCodec, SettingsError>,
    resolution: Result<TargetResolution, SettingsError>,
    fps: Result<TargetFps, SettingsError>,
    audio: Result<AudioCodec, SettingsError>,
    pattern: Result<NamingPattern, SettingsError>,
) -> Vec<SettingsError> {
    let mut errors = vec![];
    if let Err(err) = video { errors.push(err); }
    if let Err(err) = resolution { errors.push(err); }
    if let Err(err) = fps { errors.push(err); }
    if let Err(err) = audio { errors.push(err); }
    if let Err(err) = pattern { errors.push(err); }
    errors
}

fn collect_sources(input: &PathBuf) -> Result<Vec<PathBuf>, String> {
    match classify_file(input) {
        DirEntryCategory::DoesNotExist => Err(format!("{:?} does not exist.", input)),
        DirEntryCategory::SymbolicLink => Err(format!("{:?} is a symlink.", input)),
        DirEntryCategory::Unknown => Err(format!("Unable to classify {:?}.", input)),
        DirEntryCategory::RegularFile => {
            if is_video_file(input) {
                Ok(vec![input.clone()])
            } else {
                Err(format!("{:?} is not a video file (.mp4/.mkv/.mov).", input))
            }
        },
        DirEntryCategory::Directory => collect_video_files(input)
            .map_err(|err| format!("Error reading {:?}: {}", input, err)),
    }
}
