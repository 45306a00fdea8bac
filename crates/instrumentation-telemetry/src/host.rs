// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Process and host identity.
//!
//! Every value here is computed at most once per process and cached; the OS
//! and host are assumed not to change while the process runs.

use std::env;
use std::fs;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

const OS_RELEASE_PATH: &str = "/etc/os-release";
const CGROUP_PATH: &str = "/proc/self/cgroup";
const UNKNOWN: &str = "unknown";

static OS_NAME: OnceLock<String> = OnceLock::new();
static OS_VERSION: OnceLock<String> = OnceLock::new();
static HOSTNAME: OnceLock<String> = OnceLock::new();
static CONTAINER_ID: OnceLock<String> = OnceLock::new();
static RUNTIME_ID: OnceLock<String> = OnceLock::new();

/// Name of the operating system, e.g. `Ubuntu` or `macos`.
pub fn os_name() -> &'static str {
    OS_NAME.get_or_init(|| {
        fs::read_to_string(OS_RELEASE_PATH)
            .ok()
            .and_then(|contents| os_release_field(&contents, "NAME"))
            .unwrap_or_else(|| env::consts::OS.to_string())
    })
}

/// Version of the operating system, falling back to the kernel release.
pub fn os_version() -> &'static str {
    OS_VERSION.get_or_init(|| {
        fs::read_to_string(OS_RELEASE_PATH)
            .ok()
            .and_then(|contents| os_release_field(&contents, "VERSION_ID"))
            .or_else(kernel_release)
            .unwrap_or_else(|| UNKNOWN.to_string())
    })
}

/// CPU architecture of the running binary.
#[must_use]
pub fn architecture() -> &'static str {
    env::consts::ARCH
}

/// Hostname, from `DD_HOSTNAME`, `HOSTNAME`, the system, or `unknown`.
pub fn hostname() -> &'static str {
    HOSTNAME.get_or_init(|| {
        for key in ["DD_HOSTNAME", "HOSTNAME"] {
            if let Ok(hostname) = env::var(key) {
                if !hostname.trim().is_empty() {
                    return hostname.trim().to_string();
                }
            }
        }
        system_hostname().unwrap_or_else(|| {
            warn!("Could not determine hostname, using '{UNKNOWN}'");
            UNKNOWN.to_string()
        })
    })
}

/// Identifier of the container this process runs in, empty outside containers.
pub fn container_id() -> &'static str {
    CONTAINER_ID.get_or_init(|| {
        fs::read_to_string(CGROUP_PATH)
            .ok()
            .and_then(|contents| parse_container_id(&contents))
            .unwrap_or_default()
    })
}

/// Identifier unique to this process, shared by every request it sends.
pub fn runtime_id() -> &'static str {
    RUNTIME_ID.get_or_init(|| uuid::Uuid::new_v4().to_string())
}

fn os_release_field(contents: &str, field: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        let (key, value) = line.split_once('=')?;
        if key.trim() != field {
            return None;
        }
        let value = value.trim().trim_matches('"').trim_matches('\'');
        (!value.is_empty()).then(|| value.to_string())
    })
}

fn container_id_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        // docker/containerd ids, ECS task ids, then UUID-shaped ids (Fargate, cri-o)
        match Regex::new(
            r"[0-9a-f]{64}|[0-9a-f]{32}-[0-9]+|[0-9a-f]{8}[-_][0-9a-f]{4}[-_][0-9a-f]{4}[-_][0-9a-f]{4}[-_][0-9a-f]{12}",
        ) {
            Ok(re) => Some(re),
            Err(e) => {
                debug!("Failed to compile container id pattern: {e}");
                None
            }
        }
    })
    .as_ref()
}

/// Extracts the container id from the contents of `/proc/self/cgroup`.
#[must_use]
pub fn parse_container_id(cgroup: &str) -> Option<String> {
    let re = container_id_regex()?;
    cgroup.lines().find_map(|line| {
        // hierarchy-ID:controller-list:cgroup-path
        let path = line.splitn(3, ':').nth(2)?;
        let last = path.rsplit('/').next()?;
        let last = last.strip_suffix(".scope").unwrap_or(last);
        re.find(last).map(|m| m.as_str().to_string())
    })
}

#[cfg(unix)]
fn system_hostname() -> Option<String> {
    match nix::unistd::gethostname() {
        Ok(name) => name
            .to_str()
            .filter(|name| !name.is_empty())
            .map(ToString::to_string),
        Err(e) => {
            warn!("Failed to get system hostname: {e}");
            None
        }
    }
}

#[cfg(not(unix))]
fn system_hostname() -> Option<String> {
    env::var("COMPUTERNAME").ok().filter(|name| !name.is_empty())
}

#[cfg(unix)]
fn kernel_release() -> Option<String> {
    nix::sys::utsname::uname()
        .ok()
        .and_then(|uts| uts.release().to_str().map(ToString::to_string))
        .filter(|release| !release.is_empty())
}

#[cfg(not(unix))]
fn kernel_release() -> Option<String> {
    None
}
