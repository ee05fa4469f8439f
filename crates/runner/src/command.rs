//! Building and running `rsync --archive --progress`.

use std::ffi::OsString;
use std::io::{self, PipeReader};
use std::process::{Child, Command, ExitStatus, Stdio};

use logging::trace_runner;
use progress::RunnerOutput;

use crate::error::{RunnerError, RunnerResult};
use crate::location::Location;
use crate::reader::FragmentReader;
use crate::version::DEFAULT_PROGRAM;

/// Flags every invocation starts with.
const BASE_FLAGS: [&str; 2] = ["--archive", "--progress"];

/// An rsync invocation copying one source into a destination directory.
///
/// # Example
///
/// ```
/// use runner::{Location, RsyncCommand};
///
/// let source = Location::parse("/srv/photos").unwrap();
/// let destination = Location::parse("backup@nas:/volume1").unwrap();
/// let mut command = RsyncCommand::new(source, destination).unwrap();
/// command.push_ssh_option("-p", "2222");
///
/// let (program, args) = command.command_parts_for_testing();
/// assert_eq!(program, "rsync");
/// assert_eq!(args.last().unwrap(), "backup@nas:/volume1");
/// ```
#[derive(Clone, Debug)]
pub struct RsyncCommand {
    program: OsString,
    source: Location,
    destination: Location,
    ssh_options: Vec<(String, String)>,
    extra_args: Vec<OsString>,
}

impl RsyncCommand {
    /// Creates a command copying `source` into `destination`.
    ///
    /// # Errors
    ///
    /// [`RunnerError::RemoteToRemote`] when both ends are remote.
    pub fn new(source: Location, destination: Location) -> RunnerResult<Self> {
        if source.is_remote() && destination.is_remote() {
            return Err(RunnerError::RemoteToRemote {
                from: source.to_string(),
                to: destination.to_string(),
            });
        }

        Ok(Self {
            program: OsString::from(DEFAULT_PROGRAM),
            source,
            destination,
            ssh_options: Vec::new(),
            extra_args: Vec::new(),
        })
    }

    /// Runs `program` instead of the `rsync` on `PATH`.
    pub fn set_program(&mut self, program: impl Into<OsString>) {
        self.program = program.into();
    }

    /// Adds an option passed to ssh, e.g. `("-p", "2222")`.
    ///
    /// Options only take effect when one end is remote.
    pub fn push_ssh_option(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.ssh_options.push((key.into(), value.into()));
    }

    /// Adds an argument placed before the source and destination.
    pub fn push_arg(&mut self, arg: impl Into<OsString>) {
        self.extra_args.push(arg.into());
    }

    /// The source being copied.
    #[must_use]
    pub const fn source(&self) -> &Location {
        &self.source
    }

    /// The directory copied into.
    #[must_use]
    pub const fn destination(&self) -> &Location {
        &self.destination
    }

    /// Program and argument list, without spawning anything.
    #[must_use]
    pub fn command_parts_for_testing(&self) -> (OsString, Vec<OsString>) {
        (self.program.clone(), self.args())
    }

    fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = BASE_FLAGS.iter().map(OsString::from).collect();

        if !self.ssh_options.is_empty() {
            let mut shell = String::from("ssh");
            for (key, value) in &self.ssh_options {
                shell.push(' ');
                shell.push_str(key);
                shell.push(' ');
                shell.push_str(value);
            }
            args.push(OsString::from("-e"));
            args.push(OsString::from(shell));
        }

        args.extend(self.extra_args.iter().cloned());
        args.push(self.source.to_argument());
        args.push(self.destination.to_argument());
        args
    }

    /// Checks the local ends of the transfer.
    ///
    /// A local source must exist and a local destination must be a
    /// directory. Remote ends are left for rsync to check.
    pub fn validate(&self) -> RunnerResult<()> {
        if !self.destination.is_remote() && !self.destination.path().is_dir() {
            return Err(RunnerError::DestinationNotDirectory {
                path: self.destination.path().to_path_buf(),
            });
        }
        if !self.source.is_remote() && !self.source.path().exists() {
            return Err(RunnerError::MissingSource {
                path: self.source.path().to_path_buf(),
            });
        }
        Ok(())
    }

    /// Validates the command and starts rsync.
    ///
    /// stdout and stderr share one pipe so error messages arrive in order
    /// with the progress output.
    pub fn spawn(&self) -> RunnerResult<RsyncProcess> {
        self.validate()?;

        let (reader, writer) = io::pipe()?;
        let child = {
            let mut command = Command::new(&self.program);
            command
                .args(self.args())
                .env("LC_NUMERIC", "C")
                .stdin(Stdio::null())
                .stdout(writer.try_clone()?)
                .stderr(writer);
            command.spawn().map_err(|source| RunnerError::Spawn {
                program: self.program.to_string_lossy().into_owned(),
                source,
            })?
        };

        trace_runner!(
            pid = child.id(),
            source = %self.source,
            destination = %self.destination,
            "spawned rsync"
        );

        Ok(RsyncProcess {
            child,
            fragments: FragmentReader::new(reader),
            finished: false,
        })
    }
}

/// A running rsync process.
///
/// Iterating yields every output fragment, then the exit code. Dropping the
/// process before it exits kills it.
#[derive(Debug)]
pub struct RsyncProcess {
    child: Child,
    fragments: FragmentReader<PipeReader>,
    finished: bool,
}

impl RsyncProcess {
    /// Operating system id of the child.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Stops rsync early.
    pub fn kill(&mut self) -> io::Result<()> {
        self.finished = true;
        self.child.kill()?;
        self.child.wait().map(drop)
    }
}

impl Iterator for RsyncProcess {
    type Item = io::Result<RunnerOutput>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.fragments.next() {
            Some(Ok(fragment)) => Some(Ok(RunnerOutput::Fragment(fragment))),
            Some(Err(err)) => {
                self.finished = true;
                Some(Err(err))
            }
            None => {
                self.finished = true;
                let status = self.child.wait();
                Some(status.map(|status| {
                    let code = exit_code(status);
                    trace_runner!(code, "rsync exited");
                    RunnerOutput::Exit(code)
                }))
            }
        }
    }
}

impl Drop for RsyncProcess {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

/// Exit code, or `128 + signal` for a process killed by a signal.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}
