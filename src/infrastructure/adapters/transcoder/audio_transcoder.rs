//! Audio Transcoder - 基于 symphonia 的音频转码器
//!
//! 支持：
//! - WAV 解析和信息提取
//! - WAV pass-through（不重新编码）
//! - WAV → MP3（mp3lame-encoder）
//! - WAV → Opus（OGG 容器）

use async_trait::async_trait;
use mp3lame_encoder::{Builder, FlushNoGap, InterleavedPcm, MonoPcm};
use ogg::writing::PacketWriter;
use opus::{Application, Channels, Encoder};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{
    AudioFormat, AudioInfo, TranscodeConfig, TranscodeError, TranscodeResult, TranscoderPort,
};

/// Opus 支持的采样率
const OPUS_SAMPLE_RATES: [u32; 5] = [8000, 12000, 16000, 24000, 48000];

/// 音频转码器
pub struct AudioTranscoder;

impl AudioTranscoder {
    pub fn new() -> Self {
        Self
    }

    /// 解析 WAV 文件头（RIFF/fmt/data chunk）
    fn parse_wav_header(&self, data: &[u8]) -> Result<WavHeader, TranscodeError> {
        if data.len() < 44 {
            return Err(TranscodeError::InvalidInput(
                "WAV data too short".to_string(),
            ));
        }
        if &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
            return Err(TranscodeError::InvalidInput(
                "Invalid WAV: missing RIFF/WAVE header".to_string(),
            ));
        }

        let mut pos = 12;
        let mut fmt: Option<FmtChunk> = None;
        let mut data_size = 0;

        while pos + 8 <= data.len() {
            let chunk_id = &data[pos..pos + 4];
            let chunk_size =
                u32::from_le_bytes([data[pos + 4], data[pos + 5], data[pos + 6], data[pos + 7]])
                    as usize;

            match chunk_id {
                b"fmt " => {
                    if chunk_size < 16 || pos + 8 + 16 > data.len() {
                        return Err(TranscodeError::InvalidInput(
                            "Invalid fmt chunk".to_string(),
                        ));
                    }
                    let f = &data[pos + 8..pos + 24];
                    fmt = Some(FmtChunk {
                        num_channels: u16::from_le_bytes([f[2], f[3]]),
                        sample_rate: u32::from_le_bytes([f[4], f[5], f[6], f[7]]),
                        bits_per_sample: u16::from_le_bytes([f[14], f[15]]),
                    });
                }
                b"data" => {
                    data_size = chunk_size;
                    break;
                }
                _ => {}
            }

            // chunk 按偶数字节对齐
            pos += 8 + chunk_size + (chunk_size % 2);
        }

        let fmt = fmt.ok_or_else(|| {
            TranscodeError::InvalidInput("Invalid WAV: missing fmt chunk".to_string())
        })?;
        // 字节以下的位深无法按字节寻址，后续的样本计数会除零
        if fmt.bits_per_sample < 8 {
            return Err(TranscodeError::InvalidInput(format!(
                "Unsupported bits_per_sample: {}",
                fmt.bits_per_sample
            )));
        }
        if data_size == 0 {
            return Err(TranscodeError::InvalidInput(
                "Invalid WAV: missing data chunk".to_string(),
            ));
        }

        Ok(WavHeader { fmt, data_size })
    }

    /// 使用 symphonia 解码 WAV 获取 f32 PCM
    fn decode_wav(&self, data: &[u8]) -> Result<DecodedAudio, TranscodeError> {
        let cursor = Cursor::new(data.to_vec());
        let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

        let mut hint = Hint::new();
        hint.with_extension("wav");

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| TranscodeError::DecodingError(format!("Probe failed: {}", e)))?;

        let mut format = probed.format;
        let track = format
            .default_track()
            .ok_or_else(|| TranscodeError::DecodingError("No audio track found".to_string()))?;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| TranscodeError::DecodingError("Unknown sample rate".to_string()))?;
        let channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u8)
            .ok_or_else(|| TranscodeError::DecodingError("Unknown channel count".to_string()))?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| TranscodeError::DecodingError(format!("Decoder creation failed: {}", e)))?;

        let track_id = track.id;
        let mut samples: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(symphonia::core::errors::Error::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    return Err(TranscodeError::DecodingError(format!(
                        "Packet read error: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!("Decode error (skipping packet): {}", e);
                    continue;
                }
            };

            let spec = *decoded.spec();
            let num_frames = decoded.frames();
            let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            let actual = num_frames * spec.channels.count();
            samples.extend(&sample_buf.samples()[..actual]);
        }

        let duration_ms = if sample_rate > 0 && channels > 0 {
            (samples.len() as u64 * 1000) / (sample_rate as u64 * channels as u64)
        } else {
            0
        };

        Ok(DecodedAudio {
            samples,
            sample_rate,
            channels,
            duration_ms,
        })
    }

    /// f32 PCM → i16
    fn to_i16(samples: &[f32]) -> Vec<i16> {
        samples
            .iter()
            .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
            .collect()
    }

    /// 将 PCM 编码为 MP3
    fn encode_mp3(&self, pcm: &DecodedAudio, bitrate: u32) -> Result<Vec<u8>, TranscodeError> {
        if pcm.channels == 0 || pcm.channels > 2 {
            return Err(TranscodeError::InvalidInput(format!(
                "MP3 supports 1-2 channels, got {}",
                pcm.channels
            )));
        }

        let mut builder = Builder::new().ok_or_else(|| {
            TranscodeError::EncodingError("Failed to init MP3 encoder".to_string())
        })?;
        builder
            .set_num_channels(pcm.channels)
            .map_err(|e| TranscodeError::EncodingError(format!("Set channels failed: {:?}", e)))?;
        builder
            .set_sample_rate(pcm.sample_rate)
            .map_err(|e| TranscodeError::EncodingError(format!("Set sample rate failed: {:?}", e)))?;
        builder
            .set_brate(nearest_mp3_bitrate(bitrate))
            .map_err(|e| TranscodeError::EncodingError(format!("Set bitrate failed: {:?}", e)))?;
        builder
            .set_quality(mp3lame_encoder::Quality::Good)
            .map_err(|e| TranscodeError::EncodingError(format!("Set quality failed: {:?}", e)))?;

        let mut encoder = builder
            .build()
            .map_err(|e| TranscodeError::EncodingError(format!("Build encoder failed: {:?}", e)))?;

        let pcm_i16 = Self::to_i16(&pcm.samples);
        // encode_to_vec/flush_to_vec 只写入 Vec 的 spare capacity，必须先预留足够空间
        let mut out: Vec<u8> = Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(pcm_i16.len()));

        let encoded = if pcm.channels == 1 {
            encoder.encode_to_vec(MonoPcm(&pcm_i16), &mut out)
        } else {
            encoder.encode_to_vec(InterleavedPcm(&pcm_i16), &mut out)
        };
        encoded
            .map_err(|e| TranscodeError::EncodingError(format!("MP3 encode failed: {:?}", e)))?;

        encoder
            .flush_to_vec::<FlushNoGap>(&mut out)
            .map_err(|e| TranscodeError::EncodingError(format!("MP3 flush failed: {:?}", e)))?;

        Ok(out)
    }

    /// 将 PCM 编码为 Opus (OGG 容器, RFC 7845)
    fn encode_opus(&self, pcm: &DecodedAudio, bitrate: u32) -> Result<Vec<u8>, TranscodeError> {
        if pcm.channels == 0 || pcm.channels > 2 {
            return Err(TranscodeError::InvalidInput(format!(
                "Opus supports 1-2 channels, got {}",
                pcm.channels
            )));
        }

        // Opus 只接受固定几档采样率，必要时先线性重采样
        let target_rate = nearest_opus_sample_rate(pcm.sample_rate);
        let samples = if target_rate != pcm.sample_rate {
            resample_linear(&pcm.samples, pcm.sample_rate, target_rate, pcm.channels)
        } else {
            pcm.samples.clone()
        };

        let (channels, channel_count) = if pcm.channels == 1 {
            (Channels::Mono, 1usize)
        } else {
            (Channels::Stereo, 2usize)
        };

        let mut encoder = Encoder::new(target_rate, channels, Application::Voip)
            .map_err(|e| TranscodeError::EncodingError(format!("Failed to create Opus encoder: {}", e)))?;
        encoder
            .set_bitrate(opus::Bitrate::Bits(bitrate as i32))
            .map_err(|e| TranscodeError::EncodingError(format!("Failed to set bitrate: {}", e)))?;

        let pre_skip = encoder.get_lookahead().map(|l| l as u16).unwrap_or(312);

        let pcm_i16 = Self::to_i16(&samples);

        // 20ms 帧
        let frame_size = (target_rate as usize * 20) / 1000;
        let samples_per_frame = frame_size * channel_count;

        // granule position 以 48kHz 为基准
        let granule_scale = 48000.0 / target_rate as f64;
        let frame_granule = (frame_size as f64 * granule_scale) as u64;
        let mut granule_pos = (pre_skip as f64 * granule_scale) as u64;

        let mut ogg_data = Vec::new();
        {
            let mut writer = PacketWriter::new(&mut ogg_data);

            writer
                .write_packet(
                    opus_head(channel_count as u8, target_rate, pre_skip),
                    0,
                    ogg::PacketWriteEndInfo::EndPage,
                    0,
                )
                .map_err(|e| TranscodeError::EncodingError(format!("Failed to write Opus head: {}", e)))?;
            writer
                .write_packet(opus_tags(), 0, ogg::PacketWriteEndInfo::EndPage, 0)
                .map_err(|e| TranscodeError::EncodingError(format!("Failed to write Opus tags: {}", e)))?;

            let mut buf = vec![0u8; 4000];

            for chunk in pcm_i16.chunks(samples_per_frame) {
                // 末帧不足时补零
                let frame = if chunk.len() < samples_per_frame {
                    let mut padded = chunk.to_vec();
                    padded.resize(samples_per_frame, 0);
                    padded
                } else {
                    chunk.to_vec()
                };

                let len = encoder
                    .encode(&frame, &mut buf)
                    .map_err(|e| TranscodeError::EncodingError(format!("Opus encode failed: {}", e)))?;
                granule_pos += frame_granule;
                writer
                    .write_packet(
                        buf[..len].to_vec(),
                        0,
                        ogg::PacketWriteEndInfo::NormalPacket,
                        granule_pos,
                    )
                    .map_err(|e| TranscodeError::EncodingError(format!("Failed to write packet: {}", e)))?;
            }

            // 刷新编码器缓冲（pre_skip 个样本仍在编码器内）
            let flush_frames = (pre_skip as usize).div_ceil(samples_per_frame).max(1);
            let silence = vec![0i16; samples_per_frame];
            for i in 0..flush_frames {
                let len = encoder
                    .encode(&silence, &mut buf)
                    .map_err(|e| TranscodeError::EncodingError(format!("Opus flush failed: {}", e)))?;
                granule_pos += frame_granule;
                let end_info = if i == flush_frames - 1 {
                    ogg::PacketWriteEndInfo::EndStream
                } else {
                    ogg::PacketWriteEndInfo::NormalPacket
                };
                writer
                    .write_packet(buf[..len].to_vec(), 0, end_info, granule_pos)
                    .map_err(|e| TranscodeError::EncodingError(format!("Failed to write packet: {}", e)))?;
            }
        }

        Ok(ogg_data)
    }
}

impl Default for AudioTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscoderPort for AudioTranscoder {
    async fn transcode(
        &self,
        wav_data: &[u8],
        config: &TranscodeConfig,
    ) -> Result<TranscodeResult, TranscodeError> {
        // WAV 输出走 pass-through，保持时长与采样率不变
        if config.format == AudioFormat::Wav {
            let info = self.audio_info(wav_data)?;
            return Ok(TranscodeResult {
                audio_data: wav_data.to_vec(),
                format: AudioFormat::Wav,
                duration_ms: info.duration_ms,
                sample_rate: info.sample_rate,
                channels: info.channels,
            });
        }

        let decoded = self.decode_wav(wav_data)?;
        let bitrate = config.bitrate.unwrap_or(64000);

        let audio_data = match config.format {
            AudioFormat::Mp3 => self.encode_mp3(&decoded, bitrate)?,
            AudioFormat::Opus => self.encode_opus(&decoded, bitrate)?,
            AudioFormat::Wav => unreachable!("handled above"),
        };

        tracing::debug!(
            format = %config.format,
            original_size = wav_data.len(),
            transcoded_size = audio_data.len(),
            bitrate = bitrate,
            "Transcoded waveform"
        );

        Ok(TranscodeResult {
            audio_data,
            format: config.format,
            duration_ms: decoded.duration_ms,
            sample_rate: decoded.sample_rate,
            channels: decoded.channels,
        })
    }

    fn audio_info(&self, wav_data: &[u8]) -> Result<AudioInfo, TranscodeError> {
        let header = self.parse_wav_header(wav_data)?;
        let fmt = &header.fmt;

        let samples_per_channel = if fmt.bits_per_sample >= 8 && fmt.num_channels > 0 {
            header.data_size / (fmt.bits_per_sample as usize / 8) / fmt.num_channels as usize
        } else {
            0
        };
        let duration_ms = if fmt.sample_rate > 0 {
            (samples_per_channel as u64 * 1000) / fmt.sample_rate as u64
        } else {
            0
        };

        Ok(AudioInfo {
            duration_ms,
            sample_rate: fmt.sample_rate,
            channels: fmt.num_channels as u8,
            bits_per_sample: fmt.bits_per_sample,
            data_size: header.data_size,
        })
    }

    fn supports_format(&self, format: AudioFormat) -> bool {
        matches!(format, AudioFormat::Mp3 | AudioFormat::Wav | AudioFormat::Opus)
    }
}

/// 映射到 LAME 支持的最接近比特率档位
fn nearest_mp3_bitrate(bps: u32) -> mp3lame_encoder::Bitrate {
    use mp3lame_encoder::Bitrate;
    match bps / 1000 {
        0..=24 => Bitrate::Kbps24,
        25..=32 => Bitrate::Kbps32,
        33..=48 => Bitrate::Kbps48,
        49..=64 => Bitrate::Kbps64,
        65..=96 => Bitrate::Kbps96,
        97..=128 => Bitrate::Kbps128,
        129..=192 => Bitrate::Kbps192,
        _ => Bitrate::Kbps320,
    }
}

/// 映射到 Opus 支持的最接近采样率
fn nearest_opus_sample_rate(rate: u32) -> u32 {
    for supported in OPUS_SAMPLE_RATES {
        if rate <= supported {
            return supported;
        }
    }
    48000
}

/// 简单线性插值重采样（交错多声道）
fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32, channels: u8) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let channel_count = channels.max(1) as usize;
    let frame_count = samples.len() / channel_count;
    let new_frame_count = (frame_count as f64 * ratio) as usize;
    let mut out = Vec::with_capacity(new_frame_count * channel_count);

    for i in 0..new_frame_count {
        let src_pos = i as f64 / ratio;
        let src_idx = src_pos as usize;
        let frac = (src_pos - src_idx as f64) as f32;

        for ch in 0..channel_count {
            let idx0 = src_idx * channel_count + ch;
            let idx1 = (src_idx + 1).min(frame_count.saturating_sub(1)) * channel_count + ch;
            let s0 = samples.get(idx0).copied().unwrap_or(0.0);
            let s1 = samples.get(idx1).copied().unwrap_or(s0);
            out.push(s0 + (s1 - s0) * frac);
        }
    }

    out
}

/// Opus Head 包 (RFC 7845)
fn opus_head(channels: u8, sample_rate: u32, pre_skip: u16) -> Vec<u8> {
    let mut head = Vec::with_capacity(19);
    head.extend_from_slice(b"OpusHead");
    head.push(1); // version
    head.push(channels);
    head.extend_from_slice(&pre_skip.to_le_bytes());
    head.extend_from_slice(&sample_rate.to_le_bytes());
    head.extend_from_slice(&0i16.to_le_bytes()); // output gain
    head.push(0); // channel mapping family
    head
}

/// Opus Tags 包
fn opus_tags() -> Vec<u8> {
    let vendor = "voxgate";
    let mut tags = Vec::new();
    tags.extend_from_slice(b"OpusTags");
    tags.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    tags.extend_from_slice(vendor.as_bytes());
    tags.extend_from_slice(&0u32.to_le_bytes()); // no user comments
    tags
}

#[derive(Debug)]
struct WavHeader {
    fmt: FmtChunk,
    data_size: usize,
}

#[derive(Debug)]
struct FmtChunk {
    num_channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

#[derive(Debug)]
struct DecodedAudio {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u8,
    duration_ms: u64,
}
