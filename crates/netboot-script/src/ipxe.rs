//! iPXE script support
//!
//! Two scripts are served over iPXE:
//!
//! - The inspect script, returned to any machine before it is identified.
//!   It chains back to the server carrying the machine's identity labels.
//! - The boot script, rendered from a Profile's boot parameters.

use crate::error::{Result, ScriptError};

/// Interpreter line every iPXE script starts with
pub const IPXE_HEADER: &str = "#!ipxe";

/// Script returned at `/boot.ipxe`
///
/// iPXE expands the `${...}` settings client side, so the follow-up request
/// to `/ipxe` carries the machine's labels as query parameters.
const INSPECT_SCRIPT: &str = "#!ipxe
chain ipxe?uuid=${uuid}&mac=${mac:hexhyp}&domain=${domain}&hostname=${hostname}&serial=${serial}
";

/// Built-in template for the Profile boot script
pub const IPXE_BOOT_TEMPLATE: &str = "#!ipxe
kernel {{ profile.boot.kernel }}{% for arg in profile.boot.args %} {{ arg }}{% endfor %}
{% for initrd in profile.boot.initrd %}initrd {{ initrd }}
{% endfor %}boot
";

/// Commands understood by iPXE
const IPXE_COMMANDS: &[&str] = &[
    "autoboot", "boot", "cert", "certfree", "certstat", "certstore", "chain", "choose",
    "clear", "colour", "console", "cpair", "cpuid", "dhcp", "echo", "exit", "fcels",
    "fcstat", "gdbstub", "goto", "ibstat", "ifclose", "ifconf", "ifopen", "ifstat",
    "imgargs", "imgdecrypt", "imgexec", "imgextract", "imgfetch", "imgfree", "imgload",
    "imgmem", "imgselect", "imgstat", "imgtrust", "imgverify", "inc", "initrd", "ipstat",
    "isset", "iseq", "item", "iwlist", "iwstat", "kernel", "login", "lotest", "md5sum",
    "menu", "module", "neighbour", "nslookup", "nstat", "ntp", "param", "params",
    "pciscan", "ping", "poweroff", "profstat", "prompt", "pxebs", "read", "reboot",
    "route", "sanboot", "sanhook", "sanunhook", "set", "sha1sum", "shell", "shim", "show",
    "sleep", "sync", "time", "vcreate", "vdestroy",
];

/// Commands that are meaningless without an argument
const IPXE_COMMANDS_WITH_ARGUMENT: &[&str] = &[
    "chain", "goto", "imgexec", "imgfetch", "initrd", "kernel", "module", "set",
];

/// The generic chain-loading script
///
/// Independent of any Group or Profile.
pub fn inspect_script() -> &'static str {
    INSPECT_SCRIPT
}

/// Check that a rendered script is well formed for iPXE
///
/// The first line must be the `#!ipxe` header. Every other line must be
/// blank, a comment, a label, or start with a known command. Lines ending
/// in `\` continue onto the next line.
pub fn validate_ipxe(script: &str) -> Result<()> {
    let mut lines = script.lines().enumerate();

    match lines.next() {
        Some((_, header)) if header.trim_end() == IPXE_HEADER => {}
        _ => return Err(ScriptError::MissingHeader(IPXE_HEADER)),
    }

    let mut continuation = false;
    for (index, raw) in lines {
        let line = raw.trim();
        let continued = continuation;
        continuation = line.ends_with('\\');

        if continued || line.is_empty() || line.starts_with('#') || line.starts_with(':') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let command = tokens.next().unwrap_or_default();

        if !IPXE_COMMANDS.contains(&command) {
            return Err(ScriptError::UnknownCommand {
                line: index + 1,
                command: command.to_string(),
            });
        }

        if IPXE_COMMANDS_WITH_ARGUMENT.contains(&command) && tokens.next().is_none() {
            return Err(ScriptError::MissingArgument {
                line: index + 1,
                command: command.to_string(),
            });
        }
    }

    Ok(())
}
