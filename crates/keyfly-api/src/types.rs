//! Wire-level operation vocabulary for the gateway API.

/// Well-known integer codes in the gateway's `{"status": N}` payloads.
///
/// Any other value is passed through to the caller as an opaque code.
pub mod status_code {
    /// Generic success.
    pub const SUCCESS: i64 = 0;
    /// Door reported closed.
    pub const DOOR_CLOSED: i64 = 49;
    /// Door reported open.
    pub const DOOR_OPEN: i64 = 50;
}

/// A locker action that requires a signed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockerAction {
    /// Unlock the door (`POST /open`).
    Open,
    /// Lock the door (`POST /close`).
    Close,
    /// Recalibrate the lock mechanism (`POST /calibrate`).
    Calibrate,
    /// Query the lock state (`POST /locker_status`).
    Status,
}

impl LockerAction {
    /// The action-specific request path.
    pub fn path(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Calibrate => "calibrate",
            Self::Status => "locker_status",
        }
    }
}

/// A locker maintenance call: identifier-only POST, no token.
///
/// The gateway answers these with an empty or non-JSON body on success,
/// so the client treats those as success rather than a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceKind {
    /// Re-sync locker state with the gateway (`POST /locker/synchronize`).
    Synchronize,
    /// Push a firmware update to the locker (`POST /locker/update`).
    Update,
}

impl MaintenanceKind {
    pub fn path(self) -> &'static str {
        match self {
            Self::Synchronize => "locker/synchronize",
            Self::Update => "locker/update",
        }
    }
}

/// A gateway-level command, unauthenticated per the vendor API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayCommand {
    /// Enumerate known lockers (`GET /lockers`).
    ListLockers,
    /// Gateway health/status (`GET /status`).
    Status,
    /// Gateway-wide synchronize (`GET /synchronize`).
    Synchronize,
    /// Gateway firmware update (`POST /update`, empty body).
    Update,
}

impl GatewayCommand {
    pub fn path(self) -> &'static str {
        match self {
            Self::ListLockers => "lockers",
            Self::Status => "status",
            Self::Synchronize => "synchronize",
            Self::Update => "update",
        }
    }

    /// Whether this command is issued as a POST (otherwise GET).
    pub fn is_post(self) -> bool {
        matches!(self, Self::Update)
    }
}
