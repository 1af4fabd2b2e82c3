// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

#[cfg(any(feature = "metrics", test))]
pub(crate) const GROUP_NAME: &str = "group.name";

#[cfg(test)]
pub(crate) const GROUP_EVENT_NAME: &str = "group.event";

#[cfg(any(feature = "metrics", test))]
pub(crate) const GROUP_OPERATION_NAME: &str = "group.operation";

#[cfg(any(feature = "metrics", test))]
pub(crate) const GROUP_ACTIVITY_NAME: &str = "group.activity";

#[cfg(test)]
pub(crate) const GROUP_DURATION_NAME: &str = "group.duration_ns";

#[cfg(test)]
pub(crate) const GROUP_ERROR_NAME: &str = "group.error";
