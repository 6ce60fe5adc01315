//! Step response of a mass-spring-damper under speed-scheduled PID control, with progress
//! reported to an external display named by the PROGRESS_DISPLAY environment variable.
//! This example requires the `--features simulation` flag to be enabled.
// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

#[cfg(feature = "simulation")]
pub fn main() {
    use std::process::Command;

    use scheduled_pid::pid::{PidConfigBuilder, PidController, PidInput};
    use scheduled_pid::progress::spawn_sink;
    use scheduled_pid::schedule::GainTable;
    use scheduled_pid::sim;

    const RATE_HZ: f64 = 100.0;
    const N_TICKS: usize = 3000;

    let display = std::env::var("PROGRESS_DISPLAY").unwrap_or_else(|_| "./spinner".to_owned());
    let mut progress = spawn_sink(&mut Command::new(display));
    progress.update("Simulating step response");

    // Softer gains at higher speed
    let speeds = [0.0, 10.0, 30.0];
    let cfg = PidConfigBuilder::<f64>::default()
        .kp(GainTable::from_breakpoints(&speeds, &[3.0, 2.0, 1.0]).unwrap())
        .ki(GainTable::from_breakpoints(&speeds, &[2.0, 1.5, 1.0]).unwrap())
        .kd(0.5)
        .rate(RATE_HZ)
        .derivative_period(std::time::Duration::from_millis(100))
        .output_limits(-2.0, 2.0)
        .build()
        .unwrap();
    let mut pid = PidController::new(cfg);

    let mut plant = sim::ClosedLoop::new(
        sim::MassSpringDamper {
            natural_frequency: 0.5 * std::f64::consts::PI,
            damping_ratio: 0.2,
        },
        RATE_HZ,
    );
    let square = sim::SignalGenerator::new(sim::WaveForm::Square, RATE_HZ, 0.5, 0.5);
    let speed_profile = sim::SignalGenerator::new(sim::WaveForm::Sine, RATE_HZ * 10.0, 15.0, 15.0);

    println!("time,speed,setpoint,output,control");
    for tick in 0..N_TICKS {
        let setpoint = square.generate(tick);
        let speed = speed_profile.generate(tick);
        let control = pid.update(PidInput::new(setpoint - plant.position()).with_speed(speed));
        let output = plant.step(control);

        println!(
            "{:.2},{speed:.3},{setpoint:.3},{output:.5},{control:.5}",
            tick as f64 / RATE_HZ
        );
        if tick % 100 == 0 {
            progress.update_progress(tick as f64, N_TICKS as f64);
        }
    }
    progress.close();
}

#[cfg(not(feature = "simulation"))]
fn main() {
    eprintln!("This example requires `--features simulation` to run.");
}
