//! # bay-fs
//!
//! The filesystem device binding: exposes a directory tree to the agent
//! as a `"filesystem"` device. Every path argument is resolved relative
//! to the configured root and may not escape it.
//!
//! This is the reference binding for the Bay device contract; the
//! desktop, browser, and repository bindings live in their own crates
//! and follow the same shape.

pub mod device;
pub mod factory;

pub use device::FsDevice;
pub use factory::FsFactory;

use bay_core::{
    ActionSchema, CapabilityDescriptor, ObservationSpec, ParamKind, ParamSpec, Result, ReturnSpec,
};

/// Device type identifier this binding registers under.
pub const DEVICE_TYPE: &str = "filesystem";

/// The capability surface a filesystem device declares.
pub fn capabilities() -> Result<CapabilityDescriptor> {
    let mut descriptor = CapabilityDescriptor::new(
        DEVICE_TYPE,
        "A directory tree exposed as a device. All paths are relative to the device root.",
    );

    descriptor.add_action(
        ActionSchema::new("read_file", "Read a file and return its content as a string")
            .param(ParamSpec::required(
                "path",
                ParamKind::String,
                "Path relative to the device root",
            ))
            .returns(ReturnSpec::new(ParamKind::Object, "{content: string}")),
    )?;

    descriptor.add_action(
        ActionSchema::new(
            "write_file",
            "Write content to a file, creating or overwriting it",
        )
        .param(ParamSpec::required(
            "path",
            ParamKind::String,
            "Path relative to the device root",
        ))
        .param(ParamSpec::required(
            "content",
            ParamKind::String,
            "Content to write",
        )),
    )?;

    descriptor.add_action(
        ActionSchema::new(
            "append_file",
            "Append content to a file, creating it if missing",
        )
        .param(ParamSpec::required(
            "path",
            ParamKind::String,
            "Path relative to the device root",
        ))
        .param(ParamSpec::required(
            "content",
            ParamKind::String,
            "Content to append",
        )),
    )?;

    descriptor.add_action(
        ActionSchema::new("delete_file", "Delete a file").param(ParamSpec::required(
            "path",
            ParamKind::String,
            "Path relative to the device root",
        )),
    )?;

    descriptor.add_action(
        ActionSchema::new("create_dir", "Create a directory, including missing parents").param(
            ParamSpec::required("path", ParamKind::String, "Path relative to the device root"),
        ),
    )?;

    descriptor.add_action(
        ActionSchema::new("delete_dir", "Delete an empty directory").param(ParamSpec::required(
            "path",
            ParamKind::String,
            "Path relative to the device root",
        )),
    )?;

    descriptor.add_action(
        ActionSchema::new(
            "list_dir",
            "List a directory's entries with name, kind, size, and modification time",
        )
        .param(ParamSpec::optional(
            "path",
            ParamKind::String,
            "Subdirectory to list. Defaults to the device root.",
        ))
        .returns(ReturnSpec::new(
            ParamKind::Object,
            "{entries: [{name, kind, size, modified}]}",
        )),
    )?;

    descriptor.add_action(
        ActionSchema::new(
            "diff_file",
            "Compare a file's current content against the given content",
        )
        .param(ParamSpec::required(
            "path",
            ParamKind::String,
            "Path relative to the device root",
        ))
        .param(ParamSpec::required(
            "content",
            ParamKind::String,
            "Content to diff the file against",
        ))
        .returns(ReturnSpec::new(
            ParamKind::Object,
            "{diff: string} in unified diff format",
        )),
    )?;

    descriptor.add_observation(ObservationSpec::new(
        "root",
        "The absolute path of the device root",
        ReturnSpec::new(ParamKind::String, "Root directory path"),
    ))?;

    descriptor.add_observation(ObservationSpec::new(
        "usage",
        "File count and total size of everything under the root",
        ReturnSpec::new(ParamKind::Object, "{files: integer, bytes: integer}"),
    ))?;

    Ok(descriptor)
}
