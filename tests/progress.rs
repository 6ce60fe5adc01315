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
#![cfg(all(unix, feature = "std"))]

use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use scheduled_pid::progress::{spawn_sink, PipeSink, ProgressSink};

const MISSING_PEER: &str = "/nonexistent/progress-display";

#[test]
fn test_missing_peer_fails_to_spawn() {
    assert!(PipeSink::spawn(&mut Command::new(MISSING_PEER)).is_err());
}

#[test]
fn test_missing_peer_degrades_to_noop() {
    let mut sink = spawn_sink(&mut Command::new(MISSING_PEER));
    sink.update("Booting");
    sink.update_progress(1.0, 2.0);
    sink.close();
    sink.close();
}

#[test]
fn test_peer_receives_lines() {
    let path = std::env::temp_dir().join(format!("scheduled_pid_progress_{}", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let mut command = Command::new("sh");
    command
        .arg("-c")
        .arg(format!("head -n 2 > '{}'", path.display()))
        .stdout(Stdio::null());
    let mut sink = PipeSink::spawn(&mut command).unwrap();
    sink.update("Loading");
    sink.update_progress(21.0, 50.0);

    // head exits by itself after two lines
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut received = String::new();
    while Instant::now() < deadline {
        received = std::fs::read_to_string(&path).unwrap_or_default();
        if received.lines().count() == 2 {
            break;
        }
        thread::sleep(Duration::from_millis(20));
    }
    sink.close();
    let _ = std::fs::remove_file(&path);

    assert_eq!(received, "Loading\n42\n");
}

#[test]
fn test_writes_after_peer_exit_are_tolerated() {
    let mut sink = PipeSink::spawn(Command::new("true").stdout(Stdio::null())).unwrap();
    thread::sleep(Duration::from_millis(200));

    for k in 0..100 {
        sink.update("still here");
        sink.update_progress(k as f64, 100.0);
    }
    sink.close();
    assert!(sink.id().is_none());

    // Closing twice and writing to a closed sink are both no-ops
    sink.close();
    sink.update("dropped");
}

#[test]
fn test_close_terminates_running_peer() {
    let mut sink = PipeSink::spawn(Command::new("sleep").arg("30")).unwrap();
    assert!(sink.id().is_some());
    sink.update("Waiting");

    let started = Instant::now();
    sink.close();
    assert!(sink.id().is_none());
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn test_drop_closes_peer() {
    let started = Instant::now();
    {
        let mut sink = spawn_sink(Command::new("cat").stdout(Stdio::null()));
        sink.update("Bye");
    }
    assert!(started.elapsed() < Duration::from_secs(10));
}
