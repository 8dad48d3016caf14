use std::fs::{self, OpenOptions};
use std::io::{self, Read, Write};
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use tisp_core::value::to_string;
use tisp_core::{
    Error, ErrorKind, Function, HalfSignature, List, OptionalArgument, Signature, Thunk, Value,
};

use crate::{define, Table};

pub(crate) fn register(m: &mut Table) {
    // write : a... -> sep: string -> end: string -> file: (1 | 2 | string) -> mode: number -> effect
    let signature = Signature::new(
        HalfSignature::of(&[], vec![], Some("args")),
        HalfSignature::of(
            &[],
            vec![
                OptionalArgument::new("sep", Thunk::normal(" ".into())),
                OptionalArgument::new("end", Thunk::normal("\n".into())),
                OptionalArgument::new("file", Thunk::normal(1.0.into())),
                OptionalArgument::new("mode", Thunk::normal(f64::from(0o664).into())),
            ],
            None,
        ),
    );
    let write = Function::effect("write", signature, |ts| {
        let sep = ts[1].force_string()?;
        let mut parts = Vec::new();
        for t in ts[0].force_list()?.iter() {
            parts.push(to_string(&t?.try_force()?)?);
        }
        let end = ts[2].force_string()?;
        let text = parts.join(sep.as_ref()) + end.as_ref();

        let written = match ts[3].try_force()? {
            Value::Number(n) if n == 1.0 => io::stdout().lock().write_all(text.as_bytes()),
            Value::Number(n) if n == 2.0 => io::stderr().lock().write_all(text.as_bytes()),
            Value::String(path) => {
                let mode = ts[4].force_number()?;
                open(&path, mode)?.write_all(text.as_bytes())
            }
            _ => {
                return Err(Error::value(
                    "file optional argument's value must be 1 or 2, or a string filename",
                ))
            }
        };
        written.map_err(file_error)?;

        Ok(Value::List(List::Empty).into())
    });
    m.insert("write", Value::Function(write));

    // read : file: (0 | string) -> string, 0 being stdin
    let signature = Signature::new(
        HalfSignature::of(&[], vec![], None),
        HalfSignature::of(&[], vec![OptionalArgument::new("file", Thunk::normal(0.0.into()))], None),
    );
    define(m, "read", signature, |ts| {
        let read = match ts[0].try_force()? {
            Value::Number(n) if n == 0.0 => {
                let mut text = String::new();
                io::stdin().lock().read_to_string(&mut text).map(|_| text)
            }
            Value::String(path) => fs::read_to_string(&*path),
            _ => return Err(Error::value("file optional argument's value must be 0 or a string filename")),
        };
        Ok(Value::from(read.map_err(file_error)?).into())
    });
}

fn open(path: &str, mode: f64) -> Result<std::fs::File, Error> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(mode as u32);
    #[cfg(not(unix))]
    let _ = mode;
    options.open(path).map_err(file_error)
}

fn file_error(e: io::Error) -> Error {
    Error::new(ErrorKind::FileSystem, e.to_string())
}
