use std::io;

use pv_data::session::DashboardSession;

/// A way of showing a dashboard session to the user.
///
/// Implementations own the session for as long as they present it and may
/// change its date range; each change is followed by a fresh snapshot.
pub trait Presenter {
    fn present(&mut self, session: DashboardSession) -> io::Result<()>;
}
