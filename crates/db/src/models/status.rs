//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding lookup table. The topic pipeline status lives in
//! `pressroom_core::pipeline::TopicStatus` so the state machine stays in
//! the zero-dep core crate.

pub use pressroom_core::pipeline::StatusId;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Content draft publish status.
    PublishStatus {
        Draft = 1,
        /// Live on the owned site.
        Published = 2,
        /// Delivered to the external platform as well.
        Posted = 3,
        Failed = 4,
    }
}

define_status_enum! {
    /// Scheduled job execution status.
    ScheduleStatus {
        Pending = 1,
        Executing = 2,
        Completed = 3,
        Failed = 4,
        Cancelled = 5,
    }
}

define_status_enum! {
    /// Kind of content draft.
    ContentType {
        Article = 1,
        SocialPost = 2,
    }
}

define_status_enum! {
    /// Where a topic idea came from.
    TopicSource {
        Manual = 1,
        Rss = 2,
        AiSuggested = 3,
    }
}
