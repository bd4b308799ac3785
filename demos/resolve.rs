//! Builds an arc and a segment from a few named parameters and prints every
//! attribute the resolver can reach.
//!
//! ```text
//! cargo run --example resolve
//! RUST_LOG=geodef=trace cargo run --example resolve
//! ```

use geodef::{Arc, ArcParam, Entity, Param, RawValue, Segment};

fn main() -> geodef::Result<()> {
    // Default: WARN for everything, DEBUG for geodef.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("geodef=debug".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let arc = Arc::from_params([
        ("start_point", RawValue::from("0, 1, 1")),
        ("end_point", RawValue::from("0, -1, 1")),
        ("arc_height", RawValue::from([0.0, 0.0, 2.0_f64.sqrt() - 1.0])),
    ])?;
    arc.verify()?;
    for &param in ArcParam::ALL {
        match arc.get(param) {
            Ok(value) => println!("{:>18} = {value}", param.name()),
            Err(err) => println!("{:>18} ! {err}", param.name()),
        }
    }

    let segment = Segment::builder()
        .start_point("0, 0, 0")
        .end_point("0, 2, 0")
        .verify(true)
        .build()?;
    let rotated = segment.rotate_point(&[1.0, 0.0, 0.0].into(), std::f64::consts::FRAC_PI_2)?;
    println!("{segment}");
    println!("(1, 0, 0) rotated a quarter turn: {rotated}");
    Ok(())
}
