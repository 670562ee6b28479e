//! API client library for library digital signage.
//!
//! Provides a client for the LibCal calendar widget endpoints
//! (weekly hours grid and event listings).

/// LibCal widget client.
pub mod widget;
