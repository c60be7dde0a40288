use inkgrid::{MlpClassifier, PadConfig, PadEvent, ProbabilityVector, Session};
use std::error::Error;
use std::path::Path;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <weights.bin> [out.json]", args[0]);
        std::process::exit(2);
    }

    let renderer = |scores: &ProbabilityVector| {
        let (digit, score) = scores.argmax();
        println!("best: {} ({:.3})", digit, score);
    };
    let session = Session::new(PadConfig::default(), renderer)?;
    let mut session = session.finish_loading(MlpClassifier::from_file(Path::new(&args[1])));
    if let Some(reason) = session.failure() {
        return Err(reason.to_string().into());
    }

    // A single downward stroke, roughly a "1".
    session.handle(PadEvent::Down)?;
    for i in 0..=20 {
        let y = 60.0 + 8.0 * i as f32;
        session.handle(PadEvent::Move([140.0, y]))?;
    }
    session.handle(PadEvent::Up)?;

    if let (Some(out_path), Some(pipeline)) = (args.get(2), session.pipeline()) {
        let normalized = pipeline.inspect();
        let json = serde_json::to_string_pretty(&normalized.tensor)?;
        std::fs::write(out_path, json)?;
        println!("Wrote {out_path}");
    }
    Ok(())
}
