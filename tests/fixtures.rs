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

#[cfg(test)]
#[allow(dead_code)]
pub mod test_pid {

    use scheduled_pid::pid::*;
    use scheduled_pid::schedule::GainTable;

    pub const RATE_HZ: f64 = 100.0;

    /// A pure P controller with a unity gain and limits of +/-1
    pub fn make_p_config() -> PidConfig<f64> {
        PidConfigBuilder::default()
            .kp(1.0)
            .output_limits(-1.0, 1.0)
            .build()
            .unwrap()
    }

    /// A pure I controller with ki = 0.1 at 100 Hz and limits of +/-10
    pub fn make_i_config() -> PidConfig<f64> {
        PidConfigBuilder::default()
            .ki(0.1)
            .rate(RATE_HZ)
            .output_limits(-10.0, 10.0)
            .build()
            .unwrap()
    }

    /// A steering-like configuration with every gain scheduled over speed
    pub fn make_scheduled_config() -> PidConfig<f64> {
        PidConfigBuilder::default()
            .kp(GainTable::new(&[(0.0, 1.0), (10.0, 0.5), (30.0, 0.25)]).unwrap())
            .ki(GainTable::new(&[(0.0, 0.5), (30.0, 0.1)]).unwrap())
            .kd(GainTable::new(&[(5.0, 2.0), (25.0, 1.0)]).unwrap())
            .kf(0.5)
            .rate(RATE_HZ)
            .output_limits(-2.0, 2.0)
            .build()
            .unwrap()
    }

    pub fn make_controller(config: PidConfig<f64>) -> PidController<f64> {
        PidController::new(config)
    }

    /// Error sequence with sign changes and both saturation directions
    pub fn error_sequence(n: usize) -> Vec<f64> {
        (0..n)
            .map(|k| 3.0 * (k as f64 * 0.05).sin() + if k % 7 == 0 { 0.5 } else { -0.1 })
            .collect()
    }
}
