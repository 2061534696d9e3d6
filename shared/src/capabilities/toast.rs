use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToastOperation {
    Show { message: String },
}

impl Operation for ToastOperation {
    type Output = ();
}

/// Transient user-facing notice. Display duration is the shell's business.
pub struct Toast<E> {
    context: CapabilityContext<ToastOperation, E>,
}

impl<Ev> Capability<Ev> for Toast<Ev> {
    type Operation = ToastOperation;
    type MappedSelf<MappedEv> = Toast<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Toast::new(self.context.map_event(f))
    }
}

impl<E> Toast<E>
where
    E: Send + 'static,
{
    pub fn new(context: CapabilityContext<ToastOperation, E>) -> Self {
        Self { context }
    }

    pub fn show(&self, message: impl Into<String>) {
        let message = message.into();
        let context = self.context.clone();
        self.context.spawn(async move {
            context.notify_shell(ToastOperation::Show { message }).await;
        });
    }
}
