//! `define_port_error!` builds the error enums returned by driven ports.
//!
//! Each variant gets a `thiserror` message and a snake_case constructor whose
//! fields accept anything convertible into the stored type, so adapters can
//! write `ObstacleRepositoryError::query(err.to_string())`.

macro_rules! define_port_error {
    (@ctor $name:ident $variant:ident) => {
        ::paste::paste! {
            #[doc = "Construct [`" $name "::" $variant "`]."]
            #[must_use]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $name:ident $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        ::paste::paste! {
            #[doc = "Construct [`" $name "::" $variant "`]."]
            #[must_use]
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $name $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Expansion checks for the port error macro.
    use rstest::rstest;

    define_port_error! {
        /// Probe error used only by these tests.
        pub enum ProbeError {
            /// Unit variant.
            Offline => "store offline",
            /// Struct variant.
            Rejected { reason: String, attempt: u32 } => "rejected on attempt {attempt}: {reason}",
        }
    }

    #[rstest]
    fn constructors_convert_their_fields() {
        let err = ProbeError::rejected("duplicate key", 2_u8);

        assert_eq!(
            err,
            ProbeError::Rejected {
                reason: "duplicate key".to_owned(),
                attempt: 2,
            }
        );
        assert_eq!(err.to_string(), "rejected on attempt 2: duplicate key");
    }

    #[rstest]
    fn unit_variants_get_constructors() {
        assert_eq!(ProbeError::offline().to_string(), "store offline");
    }
}
