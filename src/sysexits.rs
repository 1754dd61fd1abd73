//! legacy exit status codes for system programs.
//! reference: [SYSEXITS](https://man.freebsd.org/cgi/man.cgi?query=sysexits&apropos=0&sektion=0&manpath=FreeBSD+11.2-stable&arch=default&format=html)

/// value: 65 <br>
/// The configuration data was incorrect in some way: malformed YAML/TOML or a directive list that does not match the schema.
pub const EX_DATAERR: i32 = 65;

/// value: 66 <br>
/// The configuration file named on the command line did not exist or was not readable.
pub const EX_NOINPUT: i32 = 66;

/// value: 73 <br>
/// A destination directory could not be created.
pub const EX_CANTCREAT: i32 = 73;

/// value: 74 <br>
/// An error occurred while copying a file or directory.
pub const EX_IOERR: i32 = 74;

/// value: 70 <br>
/// An internal software error has been detected. This should be limited to non-operating system related errors as possible.
pub const EX_SOFTWARE: i32 = 70;

/// value: 78 <br>
/// A required configuration input (config document or base directory) was not provided.
pub const EX_CONFIG: i32 = 78;
