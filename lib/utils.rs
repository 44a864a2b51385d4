//! Filesystem helpers for simulation outputs.

/// Create a directory and all of its parents, panicking with context on
/// failure.
#[macro_export]
macro_rules! mkdir {
    ( $dir:expr ) => {
        std::fs::create_dir_all(&$dir)
            .unwrap_or_else(|err| {
                panic!("mkdir: cannot create {:?}: {}", $dir, err)
            })
    }
}

/// Write a set of named arrays to a `.npz` archive.
///
/// ```ignore
/// write_npz!(
///     outdir.join("run.npz"),
///     arrays: {
///         "time" => &time,
///         "kt" => &kt,
///     }
/// );
/// ```
#[macro_export]
macro_rules! write_npz {
    ( $path:expr, arrays: { $( $name:expr => $arr:expr ),+ $(,)? } ) => {
        {
            let path = $path;
            let file = std::fs::File::create(&path)
                .unwrap_or_else(|err| {
                    panic!("write_npz: cannot create {:?}: {}", path, err)
                });
            let mut npz = $crate::ndarray_npy::NpzWriter::new(file);
            $(
                npz.add_array($name, $arr)
                    .unwrap_or_else(|err| {
                        panic!("write_npz: cannot write {:?} to {:?}: {}",
                            $name, path, err)
                    });
            )+
            npz.finish()
                .unwrap_or_else(|err| {
                    panic!("write_npz: cannot finalize {:?}: {}", path, err)
                });
        }
    }
}
