use alloc::sync::Arc;
use parking_lot::Mutex;
use tracing::error;

use crate::token::RcAny;

/// Callback invoked with a cached instance when the cache owning it is closed.
pub trait Finalizer<Dep>: Send + 'static {
    fn finalize(&mut self, dependency: Arc<Dep>);
}

pub(crate) type BoxedFinalizer = Arc<dyn Fn(RcAny) + Send + Sync>;

#[must_use]
pub(crate) fn boxed_finalizer_factory<Dep, Fin>(finalizer: Fin) -> BoxedFinalizer
where
    Dep: Send + Sync + 'static,
    Fin: Finalizer<Dep>,
{
    let finalizer = Mutex::new(finalizer);
    Arc::new(move |dependency: RcAny| match dependency.downcast::<Dep>() {
        Ok(dependency) => finalizer.lock().finalize(dependency),
        Err(_) => error!("Finalizer received a value of another type"),
    })
}

impl<F, Dep> Finalizer<Dep> for F
where
    F: FnMut(Arc<Dep>) + Send + 'static,
{
    #[inline]
    fn finalize(&mut self, dependency: Arc<Dep>) {
        self(dependency);
    }
}
