//! Creating implementation objects from resolved services.
//!
//! [`InstanceFactory`] turns a `(service type, algorithm)` query into an
//! [`Instance`]. When several providers implement the algorithm, a failing
//! instantiation falls over to the next candidate and only the last failure is
//! reported.

use std::any::{self, Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::resolver::{ResolvedService, ServiceResolver};
use crate::{Error, Implementation, Provider};

/// The type an implementation object is expected to have.
#[derive(Clone, Copy)]
pub struct Capability {
    type_id: TypeId,
    name: &'static str,
    check: fn(&dyn Any) -> bool,
}

fn is_a<T: Any>(implementation: &dyn Any) -> bool {
    implementation.is::<T>()
}

impl Capability {
    pub fn of<T: Any>() -> Self {
        Capability {
            type_id: TypeId::of::<T>(),
            name: any::type_name::<T>(),
            check: is_a::<T>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Type name, used in diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_satisfied_by(&self, implementation: &dyn Any) -> bool {
        (self.check)(implementation)
    }
}

impl PartialEq for Capability {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for Capability {}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capability({})", self.name)
    }
}

/// An implementation object and the provider that produced it.
pub struct Instance {
    provider: Arc<dyn Provider>,
    class_name: String,
    implementation: Implementation,
}

impl Instance {
    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Class name of the service that produced the implementation.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn implementation(&self) -> &(dyn Any + Send) {
        &*self.implementation
    }

    pub fn into_parts(self) -> (Arc<dyn Provider>, Implementation) {
        (self.provider, self.implementation)
    }

    /// Take the implementation as a concrete type.
    ///
    /// Gives the instance back unchanged if it is of another type.
    pub fn downcast<T: Any>(self) -> Result<(Arc<dyn Provider>, Box<T>), Self> {
        let Instance {
            provider,
            class_name,
            implementation,
        } = self;
        match implementation.downcast::<T>() {
            Ok(t) => Ok((provider, t)),
            Err(implementation) => Err(Instance {
                provider,
                class_name,
                implementation,
            }),
        }
    }
}

impl Instance {
    pub(crate) fn type_mismatch(&self, service_type: &str, expected: Capability) -> Error {
        Error::ImplementationTypeMismatch {
            service_type: service_type.to_string(),
            provider: self.provider.name().to_string(),
            class: self.class_name.clone(),
            expected: expected.name(),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("provider", &self.provider.name())
            .field("class_name", &self.class_name)
            .finish()
    }
}

fn no_match(service_type: &str, algorithm: &str) -> Error {
    Error::NoMatchingService {
        service_type: service_type.to_string(),
        algorithm: algorithm.to_string(),
    }
}

/// Creates instances with failover across every provider that matches.
#[derive(Debug, Clone)]
pub struct InstanceFactory {
    resolver: ServiceResolver,
}

impl InstanceFactory {
    pub fn new(resolver: ServiceResolver) -> Self {
        InstanceFactory { resolver }
    }

    pub fn resolver(&self) -> &ServiceResolver {
        &self.resolver
    }

    /// The first matching service.
    pub fn service(&self, service_type: &str, algorithm: &str) -> Result<ResolvedService, Error> {
        self.resolver
            .service(service_type, algorithm)?
            .ok_or_else(|| no_match(service_type, algorithm))
    }

    /// The service of one named provider, without consulting other providers.
    pub fn service_from_named_provider(
        &self,
        service_type: &str,
        algorithm: &str,
        provider: &str,
    ) -> Result<ResolvedService, Error> {
        let provider = self.named_provider(provider)?;
        let service = provider
            .service(service_type, algorithm)
            .ok_or_else(|| no_match(service_type, algorithm))?;
        Ok(ResolvedService::new(provider, service))
    }

    /// Create an instance, trying the best match first.
    ///
    /// Only when the first service fails to instantiate is the full list of
    /// matches resolved. Services identical to the first are not retried.
    /// Returns the last failure if no candidate succeeds.
    pub fn create(
        &self,
        service_type: &str,
        expected: Option<Capability>,
        algorithm: &str,
    ) -> Result<Instance, Error> {
        let first = self.service(service_type, algorithm)?;
        let mut failure = match self.create_from_service(&first, expected, None) {
            Ok(instance) => return Ok(instance),
            Err(e) => e,
        };
        debug!("{:?} failed, trying other providers: {}", first, failure);

        let mut list = self.resolver.services(service_type, algorithm);
        for resolved in list.iter() {
            let resolved = resolved?;
            if resolved.same_as(&first) {
                continue;
            }
            match self.create_from_service(&resolved, expected, None) {
                Ok(instance) => return Ok(instance),
                Err(e) => {
                    debug!("{:?} failed: {}", resolved, e);
                    failure = e;
                }
            }
        }
        Err(failure)
    }

    /// Create an instance with a construction parameter.
    ///
    /// Tries every match in order and returns the last failure if none succeeds.
    pub fn create_with_param(
        &self,
        service_type: &str,
        expected: Option<Capability>,
        algorithm: &str,
        param: &dyn Any,
    ) -> Result<Instance, Error> {
        let mut failure = None;
        let mut list = self.resolver.services(service_type, algorithm);
        for resolved in list.iter() {
            let resolved = resolved?;
            match self.create_from_service(&resolved, expected, Some(param)) {
                Ok(instance) => return Ok(instance),
                Err(e) => {
                    debug!("{:?} failed: {}", resolved, e);
                    failure = Some(e);
                }
            }
        }
        Err(failure.unwrap_or_else(|| no_match(service_type, algorithm)))
    }

    /// Create an instance from one named provider. No failover.
    pub fn create_from_named_provider(
        &self,
        service_type: &str,
        expected: Option<Capability>,
        algorithm: &str,
        param: Option<&dyn Any>,
        provider: &str,
    ) -> Result<Instance, Error> {
        let provider = self.named_provider(provider)?;
        self.create_from_provider(service_type, expected, algorithm, param, &provider)
    }

    /// Create an instance from an explicit provider object. No failover.
    pub fn create_from_provider(
        &self,
        service_type: &str,
        expected: Option<Capability>,
        algorithm: &str,
        param: Option<&dyn Any>,
        provider: &Arc<dyn Provider>,
    ) -> Result<Instance, Error> {
        let service = provider
            .service(service_type, algorithm)
            .ok_or_else(|| no_match(service_type, algorithm))?;
        let resolved = ResolvedService::new(provider.clone(), service);
        self.create_from_service(&resolved, expected, param)
    }

    /// Instantiate one service and check the result against `expected`.
    pub fn create_from_service(
        &self,
        resolved: &ResolvedService,
        expected: Option<Capability>,
        param: Option<&dyn Any>,
    ) -> Result<Instance, Error> {
        let implementation = resolved
            .service()
            .new_instance(param)
            .map_err(|source| Error::Instantiation {
                provider: resolved.provider_name().to_string(),
                algorithm: resolved.algorithm().to_string(),
                source,
            })?;

        if let Some(capability) = expected {
            if !capability.is_satisfied_by(&*implementation) {
                return Err(Error::ImplementationTypeMismatch {
                    service_type: resolved.service_type().to_string(),
                    provider: resolved.provider_name().to_string(),
                    class: resolved.service().class_name().to_string(),
                    expected: capability.name(),
                });
            }
        }

        Ok(Instance {
            provider: resolved.provider().clone(),
            class_name: resolved.service().class_name().to_string(),
            implementation,
        })
    }

    /// [`InstanceFactory::create`] returning the implementation as `T`.
    pub fn create_as<T: Any>(
        &self,
        service_type: &str,
        algorithm: &str,
    ) -> Result<(Arc<dyn Provider>, Box<T>), Error> {
        let capability = Capability::of::<T>();
        let instance = self.create(service_type, Some(capability), algorithm)?;
        instance
            .downcast::<T>()
            .map_err(|instance| instance.type_mismatch(service_type, capability))
    }

    fn named_provider(&self, name: &str) -> Result<Arc<dyn Provider>, Error> {
        if name.trim().is_empty() {
            return Err(Error::MissingProviderArgument);
        }
        self.resolver
            .registry()
            .provider_by_name(name)?
            .ok_or_else(|| Error::UnknownNamedProvider(name.to_string()))
    }
}
