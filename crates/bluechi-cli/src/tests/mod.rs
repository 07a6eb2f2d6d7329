//! Runtime tests for `bluechictl` against a stub bus.

mod support;
