// s7tag-rs
//
// Siemens S7 tag address parser and value codec, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

use crate::{Error, Result, Transport};
use futures::future::join_all;
use s7tag_core::{decode, plan::ReadPlanner, required_span, DecodedValue, TagDescriptor};

/// reads & decodes tags over a [`Transport`]
#[derive(Debug)]
pub struct TagReader<T> {
    transport: T,
}

impl<T: Transport> TagReader<T> {
    /// create reader
    #[inline]
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// underlying transport
    #[inline(always)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// connect the underlying transport
    #[inline]
    pub async fn connect(&self) -> Result<()> {
        self.transport.connect().await
    }

    /// disconnect the underlying transport
    #[inline]
    pub async fn disconnect(&self) -> Result<()> {
        self.transport.disconnect().await
    }

    /// fetch the tag's span and decode it
    pub async fn read_tag(&self, tag: &TagDescriptor) -> Result<DecodedValue> {
        let span = required_span(tag);
        let buf = self.transport.read(tag.block_number(), span).await?;
        Ok(decode(tag, &buf)?)
    }

    /// read named tags concurrently, one round trip each;
    /// a failing tag does not affect the others. results keep the input order.
    pub async fn read_tags<N>(&self, tags: &[(N, TagDescriptor)]) -> Vec<(N, Result<DecodedValue>)>
    where
        N: Clone,
    {
        let values = join_all(tags.iter().map(|(_, tag)| self.read_tag(tag))).await;
        tags.iter()
            .map(|(name, _)| name.clone())
            .zip(values)
            .collect()
    }

    /// read named tags with multi-item requests packed by `planner`;
    /// a failing tag or request does not affect the others. results keep the input order.
    pub async fn read_tags_planned<N>(
        &self,
        planner: &ReadPlanner,
        tags: &[(N, TagDescriptor)],
    ) -> Vec<(N, Result<DecodedValue>)>
    where
        N: Clone,
    {
        let descriptors: Vec<_> = tags.iter().map(|(_, tag)| *tag).collect();
        let requests = planner.plan(&descriptors);
        let mut values: Vec<Option<Result<DecodedValue>>> =
            std::iter::repeat_with(|| None).take(tags.len()).collect();

        for request in requests {
            let items: Vec<_> = request
                .items
                .iter()
                .map(|item| (request.block, item.span))
                .collect();
            // a lone item needs no multi-item request
            let fetched = if items.len() == 1 {
                Ok(vec![self.transport.read(items[0].0, items[0].1).await])
            } else {
                self.transport.read_many(&items).await
            };
            match fetched {
                Ok(bufs) if bufs.len() == items.len() => {
                    for (item, buf) in request.items.iter().zip(bufs) {
                        let tag = &descriptors[item.index];
                        values[item.index] =
                            Some(buf.and_then(|buf| decode(tag, &buf).map_err(Error::from)));
                    }
                }
                Ok(bufs) => {
                    let msg = format!(
                        "DB{}: {} items requested, {} returned",
                        request.block,
                        items.len(),
                        bufs.len()
                    );
                    for item in &request.items {
                        values[item.index] = Some(Err(Error::transport(msg.clone())));
                    }
                }
                Err(e) => {
                    warn!("DB{}: multi-item read failed: {}", request.block, e);
                    let msg = e.to_string();
                    for item in &request.items {
                        values[item.index] = Some(Err(Error::transport(msg.clone())));
                    }
                }
            }
        }

        tags.iter()
            .zip(values)
            .map(|((name, _), value)| {
                let value =
                    value.unwrap_or_else(|| Err(Error::transport("tag missing from read plan")));
                (name.clone(), value)
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::MemoryTransport;
    use s7tag_core::parse;

    fn seeded() -> MemoryTransport {
        let transport = MemoryTransport::new();
        transport.write_block(4, 0, &[0b0000_1000]);
        transport.write_block(4, 6, &(-42_i16).to_be_bytes());
        transport.write_block(4, 140, &[10, 4, b'h', b'u', b'r', b'z']);
        transport.write_block(4, 140 + 12, &[0]);
        transport.write_block(1, 0, &1.5_f32.to_be_bytes());
        transport
    }

    fn named(addresses: &[(&'static str, &str)]) -> Vec<(&'static str, TagDescriptor)> {
        addresses
            .iter()
            .map(|(name, address)| (*name, parse(address).unwrap()))
            .collect()
    }

    #[test]
    fn test_read_tag() -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(async {
            let reader = TagReader::new(seeded());
            reader.connect().await?;
            let value = reader.read_tag(&parse("%DB4:0.3:BOOL")?).await?;
            assert_eq!(value, DecodedValue::Bool(true));
            let value = reader.read_tag(&parse("%DB4:140:STRING(10)")?).await?;
            assert_eq!(value.as_str(), Some("hurz"));
            reader.disconnect().await?;
            Ok(())
        })
    }

    #[test]
    fn test_read_tags_isolated() -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(async {
            let reader = TagReader::new(seeded());
            reader.connect().await?;
            let tags = named(&[
                ("flag", "%DB4:0.3:BOOL"),
                ("missing", "%DB9:0:INT"),
                ("counter", "%DB4:6:INT"),
            ]);
            let res = reader.read_tags(&tags).await;
            assert_eq!(res.len(), 3);
            assert_eq!(res[0].0, "flag");
            assert_eq!(res[0].1.as_ref().ok(), Some(&DecodedValue::Bool(true)));
            assert!(res[1].1.is_err());
            assert_eq!(res[2].1.as_ref().ok(), Some(&DecodedValue::Int(-42)));
            Ok(())
        })
    }

    #[test]
    fn test_read_tags_planned() -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(async {
            let reader = TagReader::new(seeded());
            reader.connect().await?;
            let tags = named(&[
                ("counter", "%DB4:6:INT"),
                ("speed", "%DB1:0:REAL"),
                ("flag", "%DB4:0.3:BOOL"),
                ("name", "%DB4:140:STRING(10)"),
                ("beyond", "%DB4:400:INT"),
            ]);
            let res = reader
                .read_tags_planned(&ReadPlanner::default(), &tags)
                .await;
            let names: Vec<_> = res.iter().map(|(name, _)| *name).collect();
            assert_eq!(names, vec!["counter", "speed", "flag", "name", "beyond"]);
            assert_eq!(res[0].1.as_ref().ok(), Some(&DecodedValue::Int(-42)));
            assert_eq!(res[1].1.as_ref().ok(), Some(&DecodedValue::Real(1.5)));
            assert_eq!(res[2].1.as_ref().ok(), Some(&DecodedValue::Bool(true)));
            assert_eq!(
                res[3].1.as_ref().ok().and_then(|v| v.as_str()),
                Some("hurz")
            );
            assert!(res[4].1.is_err());
            // one request for DB1, one for DB4
            assert_eq!(reader.transport().round_trips(), 2);
            Ok(())
        })
    }

    #[test]
    fn test_read_tags_planned_not_connected() -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(async {
            let reader = TagReader::new(seeded());
            let tags = named(&[("counter", "%DB4:6:INT"), ("flag", "%DB4:0.3:BOOL")]);
            let res = reader
                .read_tags_planned(&ReadPlanner::default(), &tags)
                .await;
            assert!(res.iter().all(|(_, v)| v.is_err()));
            Ok(())
        })
    }
}
