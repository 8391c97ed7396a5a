/// Generate the `new` constructor for a client wrapping a `ResourceClient`.
macro_rules! impl_client_new {
    ($client_name:ident, $entity:ty) => {
        impl $client_name {
            pub fn new(inner: crate::actor_framework::ResourceClient<$entity>) -> Self {
                Self { inner }
            }
        }
    };
}

/// Generate one client method per entity action.
///
/// The method name in snake case names both the action variant and the
/// result variant in camel case (`clear` -> `Action::Clear {}` and
/// `Result::Clear(value)`). Method parameters become the variant's fields.
/// Any other result variant is reported as an unexpected reply.
macro_rules! impl_action_methods {
    ($client_name:ident, $action:ident => $result:ident, $error:ty {
        $( fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty; )*
    }) => {
        paste::paste! {
            impl $client_name {
                $(
                    #[tracing::instrument(skip(self))]
                    pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, $error> {
                        tracing::debug!("Sending request");
                        match self.inner.perform_action($action::[<$method:camel>] { $($param),* }).await? {
                            $result::[<$method:camel>](value) => Ok(value),
                            other => Err(<$error>::UnexpectedReply(format!("{:?}", other))),
                        }
                    }
                )*
            }
        }
    };
}
