//! Host command execution helper

use layerwarp_core::{CommandChannel, Descriptor, DescriptorResult};

use crate::error::Result;

/// Send one descriptor and wait for its result
pub(crate) async fn execute<C>(channel: &C, descriptor: &Descriptor) -> Result<DescriptorResult>
where
    C: CommandChannel + ?Sized,
{
    tracing::debug!("host <- {}", descriptor);
    let result = channel.execute(descriptor).await?;
    tracing::trace!("host -> {:?}", result.as_map());
    Ok(result)
}

/// Send descriptors strictly one after another
pub(crate) async fn execute_all<C>(channel: &C, descriptors: &[Descriptor]) -> Result<()>
where
    C: CommandChannel + ?Sized,
{
    for descriptor in descriptors {
        execute(channel, descriptor).await?;
    }
    Ok(())
}
