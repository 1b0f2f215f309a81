use std::ffi::OsStr;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::path::Path;
use std::process::{Command, Output};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

/// Start production date served for every coverage except `broken`.
pub const START_PRODUCTION_DATE: &str = "20240301";

pub struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ServerHandle {
    /// Request targets (path and query) received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawn a minimal routing API for tests.
///
/// `GET /v1/coverage/{cov}` answers coverage metadata (404 for `broken`),
/// `GET /v1/coverage/{cov}/journeys?...` answers 200, or 503 when the query
/// holds `fail=1`.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_routing_server() -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    let seen = Arc::clone(&seen);
                    thread::spawn(move || handle_client(stream, &seen));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(5));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        format!("http://{}/v1", addr),
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
            requests,
        },
    ))
}

/// Like [`spawn_routing_server`], but skips when sockets are not permitted.
///
/// # Errors
///
/// Returns an error for any other server setup failure.
pub fn spawn_routing_server_or_skip() -> Result<Option<(String, ServerHandle)>, String> {
    match spawn_routing_server() {
        Ok(result) => Ok(Some(result)),
        Err(err) if err.contains("Operation not permitted") => {
            eprintln!("Skipping e2e test: {}", err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn read_request_target(stream: &mut TcpStream) -> Option<String> {
    drop(stream.set_read_timeout(Some(Duration::from_secs(5))));
    let mut request = Vec::new();
    let mut buffer = [0u8; 1024];
    while !request.windows(4).any(|window| window == b"\r\n\r\n") {
        let read = stream.read(&mut buffer).ok()?;
        if read == 0 {
            break;
        }
        request.extend_from_slice(buffer.get(..read)?);
    }
    let text = String::from_utf8_lossy(&request);
    let line = text.lines().next()?;
    line.split_whitespace().nth(1).map(str::to_owned)
}

fn route(target: &str) -> (&'static str, String) {
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let Some(rest) = path.strip_prefix("/v1/coverage/") else {
        return ("404 Not Found", "{}".to_owned());
    };
    match rest.split_once('/') {
        None if rest == "broken" => ("404 Not Found", r#"{"error":"unknown coverage"}"#.to_owned()),
        None => (
            "200 OK",
            format!(
                r#"{{"regions":[{{"id":"{}","start_production_date":"{}"}}]}}"#,
                rest, START_PRODUCTION_DATE
            ),
        ),
        Some((_, "journeys")) if query.split('&').any(|pair| pair == "fail=1") => {
            ("503 Service Unavailable", r#"{"error":"busy"}"#.to_owned())
        }
        Some((_, "journeys")) => ("200 OK", r#"{"journeys":[]}"#.to_owned()),
        Some(_) => ("404 Not Found", "{}".to_owned()),
    }
}

fn handle_client(mut stream: TcpStream, seen: &Mutex<Vec<String>>) {
    let Some(target) = read_request_target(&mut stream) else {
        return;
    };
    if let Ok(mut requests) = seen.lock() {
        requests.push(target.clone());
    }
    let (status, body) = route(&target);
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    if stream.write_all(response.as_bytes()).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

/// Run the `routebench` binary in `cwd` and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_routebench<I, S>(cwd: &Path, args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = routebench_bin()?;
    Command::new(bin)
        .current_dir(cwd)
        .args(args)
        .env("ROUTEBENCH_LOG", "warn")
        .env_remove("ROUTEBENCH_SERVER_URL")
        .env_remove("ROUTEBENCH_COVERAGE")
        .env_remove("ROUTEBENCH_TOKEN")
        .env_remove("ROUTEBENCH_CONCURRENCY")
        .env_remove("ROUTEBENCH_EXTRA_ARGS")
        .env_remove("ROUTEBENCH_OUTPUT_DIR")
        .output()
        .map_err(|err| format!("run routebench failed: {}", err))
}

fn routebench_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_routebench").map_or_else(
        || Err("CARGO_BIN_EXE_routebench missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}

/// Formats captured output for assertion messages.
pub fn describe(output: &Output) -> String {
    format!(
        "status: {:?}\nstdout: {}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}
